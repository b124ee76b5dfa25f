use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// 前端未构建时嵌入的占位页面，`%SITE_NAME%` 在运行时替换
const PLACEHOLDER_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>%SITE_NAME%</title>
    <style>
        body { font-family: system-ui, sans-serif; max-width: 560px; margin: 96px auto; padding: 0 20px; }
        pre { background: #f4f4f5; padding: 12px; border-radius: 6px; }
    </style>
</head>
<body>
    <h1>%SITE_NAME%</h1>
    <p>The API is running, but the web client has not been built into this binary.</p>
    <pre>cd frontend &amp;&amp; bun install &amp;&amp; bun run build</pre>
    <p>Then rebuild the server.</p>
</body>
</html>
"#;

fn main() {
    println!("cargo:rerun-if-changed=frontend/dist");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").map(PathBuf::from).unwrap_or_default();
    let dist = manifest_dir.join("frontend/dist");

    if dist.join("index.html").exists() {
        return;
    }
    println!("cargo:warning=frontend/dist not found, embedding a placeholder page");
    if let Err(e) = write_placeholder(&dist) {
        panic!("failed to create {}: {e}", dist.display());
    }
}

fn write_placeholder(dist: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dist.join("assets"))?;
    fs::write(dist.join("index.html"), PLACEHOLDER_INDEX)
}
