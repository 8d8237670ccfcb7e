//! Ingestion config templates for custom log formats.
//!
//! Templates use `{{ name }}` placeholders. Rendering is a pure function of
//! the template and the field map, so the same request always yields the
//! same bytes and the synchronizer can skip unchanged files.

use std::collections::BTreeMap;
use std::path::Path;

use logvol_common::error::{LogvolError, Result};

const CLUSTER_SOURCE_TEMPLATE: &str = "<source>
@type tail
path {{ path }}
pos_file {{ cluster_pos_path }}
tag cluster-custom.*
format {{ format }}
time_format %Y-%m-%dT%H:%M:%S
</source>
";

const PROJECT_SOURCE_TEMPLATE: &str = "<source>
@type tail
path {{ path }}
pos_file {{ project_pos_path }}
tag project-custom.{{ project }}.*
format {{ format }}
time_format %Y-%m-%dT%H:%M:%S
</source>
";

/// Which config scope to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Config read by the cluster-level shipper.
    Cluster,
    /// Config read by the project-level shipper.
    Project,
}

impl TemplateKind {
    /// Scope name used in errors and log lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::Project => "project",
        }
    }

    const fn source(self) -> &'static str {
        match self {
            Self::Cluster => CLUSTER_SOURCE_TEMPLATE,
            Self::Project => PROJECT_SOURCE_TEMPLATE,
        }
    }
}

/// Values interpolated into both templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFields {
    /// Glob matching the workload's log files.
    pub path: String,
    /// Shipper format expression.
    pub format: String,
    /// `<cluster id>:<project id>` tag component.
    pub project: String,
    /// Cluster-scope position file.
    pub cluster_pos_path: String,
    /// Project-scope position file.
    pub project_pos_path: String,
}

impl ConfigFields {
    /// Builds the fields for a host log directory.
    pub fn new(
        host_log_dir: &Path,
        format: &str,
        cluster_id: &str,
        project_id: &str,
        cluster_position: &Path,
        project_position: &Path,
    ) -> Self {
        Self {
            path: format!("{}/*.*", host_log_dir.display()),
            format: format.to_owned(),
            project: format!("{cluster_id}:{project_id}"),
            cluster_pos_path: cluster_position.display().to_string(),
            project_pos_path: project_position.display().to_string(),
        }
    }

    /// Placeholder name to value.
    pub fn to_map(&self) -> BTreeMap<&'static str, &str> {
        BTreeMap::from([
            ("path", self.path.as_str()),
            ("format", self.format.as_str()),
            ("project", self.project.as_str()),
            ("cluster_pos_path", self.cluster_pos_path.as_str()),
            ("project_pos_path", self.project_pos_path.as_str()),
        ])
    }
}

/// Renders the named template.
///
/// # Errors
///
/// Returns [`LogvolError::Template`] if a placeholder is unterminated or
/// has no value, or if a value would split a config directive.
pub fn render(kind: TemplateKind, fields: &BTreeMap<&str, &str>) -> Result<String> {
    render_source(kind.name(), kind.source(), fields)
}

fn render_source(
    name: &'static str,
    source: &str,
    fields: &BTreeMap<&str, &str>,
) -> Result<String> {
    let fail = |message: String| LogvolError::Template {
        template: name,
        message,
    };

    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let close = after
            .find("}}")
            .ok_or_else(|| fail(format!("unterminated placeholder at byte {}", source.len() - rest.len() + open)))?;
        let key = after[..close].trim();
        let value = fields
            .get(key)
            .ok_or_else(|| fail(format!("missing field {key:?}")))?;
        if value.contains(['\n', '\r']) {
            return Err(fail(format!("field {key:?} contains a line break")));
        }
        out.push_str(value);
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    Ok(out)
}
