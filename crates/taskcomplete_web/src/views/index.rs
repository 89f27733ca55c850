use axum::response::Html;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Task Complete</title>
</head>
<body>
  <h1>Task Complete</h1>
  <p>Organise your work into projects and keep track of what is left to do.</p>
  <nav>
    <a href="/projects/">Projects</a>
    <a href="/tasks/">Open tasks</a>
    <a href="/completedtasks/">Completed tasks</a>
    <a href="/signup/">Sign up</a>
    <a href="/account/login/">Log in</a>
  </nav>
</body>
</html>
"#;

/// Static landing page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
