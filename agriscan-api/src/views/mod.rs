/// HTML views
///
/// Every page is rendered through [`layout`], which owns the navigation bar
/// and the shared stylesheet. Pages carry no scripts; forms post back to the
/// server. All user-supplied text goes through [`escape_html`].

use agriscan_shared::classifier::ClassificationResult;

const STYLE: &str = "\
:root{--green:#0a8400;--dark:#044a00;--light:#e8ffe8}\
*{box-sizing:border-box;margin:0;padding:0;font-family:Arial,sans-serif}\
body{display:flex;flex-direction:column;min-height:100vh;background:#f5fff5;color:#222}\
nav{display:flex;justify-content:space-between;align-items:center;padding:14px 20px;background:var(--green);color:#fff}\
nav .brand{font-size:1.4rem;font-weight:bold}\
nav a{color:#fff;text-decoration:none;margin-left:20px}\
main{flex:1;padding:60px 20px;text-align:center}\
footer{background:#ddd;padding:12px;text-align:center;font-size:.9rem;color:#444}\
.btn,button{padding:10px 22px;border:none;border-radius:6px;background:var(--green);color:#fff;cursor:pointer}\
.card{display:inline-block;padding:24px;margin:14px;border-radius:12px;min-width:250px;background:#ffffffd0}\
.error{color:#b00020;margin-top:14px}\
.chat{max-width:600px;margin:30px auto;text-align:left;border:1px solid #ccc;padding:16px;border-radius:8px;background:#fff}\
form{margin-top:40px}\
input{padding:10px;border:1px solid #999;border-radius:6px;width:220px}";

/// Escapes text for inclusion in HTML element content or attribute values
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wraps a page body in the shared document shell
///
/// The navigation shows Dashboard/Logout for a signed-in user and
/// Login/Sign Up otherwise.
pub fn layout(title: &str, user: Option<&str>, body: &str) -> String {
    let account_links = match user {
        Some(_) => r#"<a href="/dashboard">Dashboard</a><a href="/logout">Logout</a>"#,
        None => r#"<a href="/login">Login</a><a href="/signup">Sign Up</a>"#,
    };

    format!(
        r#"<!doctype html>
<html lang="en"><head>
<meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head><body>
<nav>
  <span class="brand">AgriScan</span>
  <div><a href="/">Home</a><a href="/#services">Services</a><a href="/chatbot">ChatBot</a>{account_links}</div>
</nav>
<main>{body}</main>
<footer>&copy; AgriScan AI &middot; Making farming smarter</footer>
</body></html>"#,
        title = escape_html(title),
        style = STYLE,
        account_links = account_links,
        body = body,
    )
}

fn error_line(error: Option<&str>) -> String {
    error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape_html(e)))
        .unwrap_or_default()
}

pub fn landing(user: Option<&str>) -> String {
    let cta = match user {
        Some(_) => r#"<a class="btn" href="/scan">Start a Scan</a>"#,
        None => r#"<a class="btn" href="/signup">Get Started</a>"#,
    };

    let body = format!(
        r#"<header>
 <h1>Crop-disease detection at your fingertips</h1>
 <p>Snap, upload and save your harvest. No need to pay a specialist.</p>
 <p style="margin-top:20px">{cta}</p>
</header>
<section id="services" style="margin-top:60px">
 <h2>Our Services</h2>
 <div class="card"><h3>Plant-Disease Scan</h3><p>Instant leaf-disease diagnosis powered by AI.</p></div>
 <div class="card"><h3>Ask AgriScan AI</h3><p>Farming questions answered in plain language.</p></div>
 <div class="card"><h3>Weather Alerts</h3><p>A daily SMS forecast when you sign up with a phone number.</p></div>
</section>"#
    );

    layout("AgriScan - Home", user, &body)
}

pub fn signup(error: Option<&str>) -> String {
    let body = format!(
        r#"<h2>Create an account</h2>
<form method="post" action="/signup">
  <input name="u" placeholder="Username" autocomplete="username"><br><br>
  <input type="password" name="p" placeholder="Password" autocomplete="new-password"><br><br>
  <input name="phone" placeholder="Phone for SMS alerts (optional)" autocomplete="tel"><br><br>
  <button>Sign Up</button>
</form>
{error}
<p style="margin-top:22px">Already have an account? <a href="/login">Log in</a></p>"#,
        error = error_line(error),
    );

    layout("Sign Up", None, &body)
}

pub fn login(error: Option<&str>) -> String {
    let body = format!(
        r#"<h2>Login</h2>
<form method="post" action="/login">
  <input name="u" placeholder="Username" autocomplete="username"><br><br>
  <input type="password" name="p" placeholder="Password" autocomplete="current-password"><br><br>
  <button>Login</button>
</form>
{error}
<p style="margin-top:22px">New here? <a href="/signup">Create account</a></p>"#,
        error = error_line(error),
    );

    layout("Login", None, &body)
}

pub fn dashboard(user: &str) -> String {
    let body = format!(
        r#"<h2>Welcome, {user}</h2>
<div class="card"><h3><a href="/scan">Start Plant-Disease Scan</a></h3></div>
<div class="card"><h3><a href="/chatbot">Ask AgriScan AI</a></h3></div>
<p style="margin-top:35px"><a href="/logout">Log out</a></p>"#,
        user = escape_html(user),
    );

    layout("Dashboard", Some(user), &body)
}

/// Upload form, followed by the result of the last classification if any
pub fn scan(user: &str, result: Option<&ClassificationResult>) -> String {
    let result_html = result
        .map(|r| {
            format!(
                r#"<h3 style="margin-top:40px">Result</h3>
<p>Disease/Status: <b>{label}</b></p>
<p>Confidence: {confidence:.1}%</p>"#,
                label = escape_html(&r.label),
                confidence = r.confidence * 100.0,
            )
        })
        .unwrap_or_default();

    let body = format!(
        r#"<h2>Upload Leaf Image</h2>
<form action="/predict" method="post" enctype="multipart/form-data">
  <input type="file" name="file" accept="image/*"><br><br>
  <button>Scan</button>
</form>
{result_html}
<p style="margin-top:30px"><a href="/dashboard">Back</a></p>"#
    );

    layout("Leaf Scan", Some(user), &body)
}

/// What the assistant produced for the last question
#[derive(Debug, Clone, Copy)]
pub enum ChatOutcome<'a> {
    Reply(&'a str),
    Error(&'a str),
}

pub fn chat(user: &str, question: Option<&str>, outcome: Option<ChatOutcome<'_>>) -> String {
    let mut transcript = String::new();
    if let Some(q) = question {
        transcript.push_str(&format!("<p><b>You:</b> {}</p>", escape_html(q)));
    }
    match outcome {
        Some(ChatOutcome::Reply(text)) => transcript.push_str(&format!(
            "<p style=\"margin-top:10px;white-space:pre-wrap\"><b>Bot:</b> {}</p>",
            escape_html(text)
        )),
        Some(ChatOutcome::Error(text)) => transcript.push_str(&error_line(Some(text))),
        None => {}
    }

    let transcript = if transcript.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="chat">{}</div>"#, transcript)
    };

    let body = format!(
        r#"<h2>Ask AgriScan AI</h2>
{transcript}
<form method="post" action="/chatbot">
  <input name="message" style="width:60%" placeholder="Type your question"><br><br>
  <button>Send</button>
</form>"#
    );

    layout("ChatBot", Some(user), &body)
}
