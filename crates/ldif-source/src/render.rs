//! Template rendering of data files.

use crate::error::LdifError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use sync_core::template::substitute_with;

/// Variables available to data file templates.
pub type TemplateContext = Map<String, Value>;

fn context_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Substitute `$name` / `${name}` placeholders from the context.
pub fn render_str(template: &str, context: &TemplateContext) -> String {
    substitute_with(template, |name| context.get(name).map(context_value))
}

/// Render `src` into `dst`, creating parent directories as needed.
pub async fn render_file(src: &Path, dst: &Path, context: &TemplateContext) -> Result<(), LdifError> {
    let template = tokio::fs::read_to_string(src)
        .await
        .map_err(|e| LdifError::io(src, e))?;

    if let Some(parent) = dst.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| LdifError::io(parent, e))?;
    }

    tokio::fs::write(dst, render_str(&template, context))
        .await
        .map_err(|e| LdifError::io(dst, e))?;

    tracing::debug!("Rendered {} to {}", src.display(), dst.display());
    Ok(())
}

/// Render each template-relative file from `templates_dir` into the same
/// relative path under `render_dir`, returning the rendered paths in order.
pub async fn render_files<S: AsRef<str>>(
    files: &[S],
    templates_dir: &Path,
    render_dir: &Path,
    context: &TemplateContext,
) -> Result<Vec<PathBuf>, LdifError> {
    let mut rendered = Vec::with_capacity(files.len());
    for file in files {
        let src = templates_dir.join(file.as_ref());
        let dst = render_dir.join(file.as_ref());
        render_file(&src, &dst, context).await?;
        rendered.push(dst);
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn context() -> TemplateContext {
        match json!({"hostname": "auth.example.org", "port": 443, "enabled": true}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_render_str() {
        let rendered = render_str(
            "jansHost: https://${hostname}:$port\njansEnabled: $enabled\ncost: $$5 $unknown",
            &context(),
        );
        assert_eq!(
            rendered,
            "jansHost: https://auth.example.org:443\njansEnabled: true\ncost: $5 $unknown"
        );
    }

    #[tokio::test]
    async fn test_render_files_preserves_relative_paths() {
        let templates = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        std::fs::create_dir_all(templates.path().join("jans-auth")).unwrap();
        std::fs::write(
            templates.path().join("jans-auth/clients.ldif"),
            "dn: inum=1,o=jans\njansHost: $hostname\n",
        )
        .unwrap();

        let rendered = render_files(
            &["jans-auth/clients.ldif"],
            templates.path(),
            &output.path().join("tmp"),
            &context(),
        )
        .await
        .unwrap();

        assert_eq!(rendered, vec![output.path().join("tmp/jans-auth/clients.ldif")]);
        let content = std::fs::read_to_string(&rendered[0]).unwrap();
        assert_eq!(content, "dn: inum=1,o=jans\njansHost: auth.example.org\n");
    }

    #[tokio::test]
    async fn test_missing_template() {
        let templates = TempDir::new().unwrap();
        let err = render_files(&["nope.ldif"], templates.path(), templates.path(), &context())
            .await
            .unwrap_err();
        assert!(matches!(err, LdifError::Io { .. }));
    }
}
