/// Wraps a plain-text body in the HTML document sent for every slot.
///
/// Newlines become `<br>`; subject and body are inserted verbatim, without
/// escaping. Content is trusted as produced by the generator or the editor.
pub fn wrap_html(subject: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{subject}</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    {body}
  </div>
</body>
</html>
"#,
        subject = subject,
        body = body.replace('\n', "<br>")
    )
}
