//! HTML template for the render surface.
//!
//! The surface can only load resources through URIs the host hands out, so
//! every `src`/`href` in the template is rewritten before it is served.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Replaced with the surface's content-security-policy source.
pub const CSP_PLACEHOLDER: &str = "%CSP_SOURCE%";

static RESOURCE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(src|href)="([^"]*)""#).expect("resource attribute pattern is valid"));

/// Fill in the CSP source and rewrite resource references.
///
/// Each referenced path is resolved against `base_dir` and mapped through
/// `to_resource_uri`.
pub fn prepare_html<F>(template: &str, base_dir: &Path, csp_source: &str, to_resource_uri: F) -> String
where
    F: Fn(&Path) -> String,
{
    let with_csp = template.replace(CSP_PLACEHOLDER, csp_source);
    RESOURCE_ATTR
        .replace_all(&with_csp, |caps: &Captures| {
            let resource = base_dir.join(&caps[2]);
            format!("{}=\"{}\"", &caps[1], to_resource_uri(&resource))
        })
        .into_owned()
}

/// Read the template at `path` and prepare it relative to its own directory.
pub async fn read_html<F>(path: &Path, csp_source: &str, to_resource_uri: F) -> std::io::Result<String>
where
    F: Fn(&Path) -> String,
{
    let template = tokio::fs::read_to_string(path).await?;
    let base_dir = path.parent().map(PathBuf::from).unwrap_or_default();
    Ok(prepare_html(&template, &base_dir, csp_source, to_resource_uri))
}

/// `file://` URI for a local resource.
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}
