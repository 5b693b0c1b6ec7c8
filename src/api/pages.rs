//! Server-rendered HTML pages.
//!
//! The portal serves a handful of small forms, so pages are assembled with
//! `format!` around a shared layout instead of pulling in a template engine.

use crate::api::handlers::storage::User;

/// Minimal HTML escaping for user-supplied values interpolated into pages.
pub(crate) fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, user: Option<&User>, flashes: &[String], body: &str) -> String {
    let navigation = if let Some(user) = user {
        format!(
            "<li><a href=\"/\">overview</a></li>\n\
             <li><a href=\"/profile\">profile ({})</a></li>\n\
             <li><a href=\"/logout\">sign out</a></li>",
            escape(&user.name)
        )
    } else {
        "<li><a href=\"/\">overview</a></li>\n<li><a href=\"/login\">sign in</a></li>".to_string()
    };

    let messages = flashes
        .iter()
        .map(|message| format!("<p class=\"message\">{}</p>", escape(message)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<!doctype html>\n\
         <html>\n\
         <head><title>{title} | oidportal</title></head>\n\
         <body>\n\
         <h1>{title}</h1>\n\
         <ul class=\"navigation\">\n{navigation}\n</ul>\n\
         {messages}\n\
         {body}\n\
         </body>\n\
         </html>\n"
    )
}

pub(crate) fn index_page(user: Option<&User>, flashes: &[String]) -> String {
    let body = if let Some(user) = user {
        format!(
            "<p>Hello {}! You are signed in as {}.</p>",
            escape(&user.name),
            escape(&user.openid)
        )
    } else {
        "<p>You are not signed in.</p>".to_string()
    };
    layout("Overview", user, flashes, &body)
}

pub(crate) fn login_page(flashes: &[String], next: &str) -> String {
    let body = format!(
        "<form method=\"post\" action=\"/login\">\n\
         <p>OpenID:\n\
         <input type=\"text\" name=\"openid\" size=\"60\" />\n\
         <input type=\"hidden\" name=\"next\" value=\"{}\" />\n\
         <input type=\"submit\" value=\"Sign in\" /></p>\n\
         </form>",
        escape(next)
    );
    layout("Sign in", None, flashes, &body)
}

pub(crate) fn create_profile_page(flashes: &[String], next: &str, name: &str, email: &str) -> String {
    let body = format!(
        "<p>Hey! This is the first time you signed in on this website. In\n\
         order to proceed we need a couple of more information from you:</p>\n\
         <form method=\"post\" action=\"/create-profile\">\n\
         <p>Name:\n\
         <input type=\"text\" name=\"name\" size=\"30\" value=\"{}\" /></p>\n\
         <p>E-Mail:\n\
         <input type=\"text\" name=\"email\" size=\"30\" value=\"{}\" /></p>\n\
         <input type=\"hidden\" name=\"next\" value=\"{}\" />\n\
         <p><input type=\"submit\" value=\"Create profile\" /></p>\n\
         </form>\n\
         <p>If you don't want to proceed, you can <a href=\"/logout\">sign out</a> again.</p>",
        escape(name),
        escape(email),
        escape(next)
    );
    layout("Create Profile", None, flashes, &body)
}

pub(crate) fn edit_profile_page(flashes: &[String], user: &User, name: &str, email: &str) -> String {
    let body = format!(
        "<form method=\"post\" action=\"/profile\">\n\
         <p>Name:\n\
         <input type=\"text\" name=\"name\" size=\"30\" value=\"{}\" /></p>\n\
         <p>E-Mail:\n\
         <input type=\"text\" name=\"email\" size=\"30\" value=\"{}\" /></p>\n\
         <p><input type=\"submit\" value=\"Update profile\" />\n\
         <input type=\"submit\" name=\"delete\" value=\"Delete profile\" /></p>\n\
         </form>",
        escape(name),
        escape(email)
    );
    layout("Edit Profile", Some(user), flashes, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: 1,
            name: "Armin".to_string(),
            email: "armin@example.com".to_string(),
            openid: "https://id.example.com#abc".to_string(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<script>\"&'"),
            "&lt;script&gt;&quot;&amp;&#39;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_index_page_signed_out() {
        let page = index_page(None, &[]);
        assert!(page.contains("You are not signed in"));
        assert!(page.contains("href=\"/login\""));
        assert!(!page.contains("href=\"/logout\""));
    }

    #[test]
    fn test_index_page_signed_in() {
        let user = test_user();
        let page = index_page(Some(&user), &["Successfully signed in".to_string()]);
        assert!(page.contains("Hello Armin!"));
        assert!(page.contains("href=\"/logout\""));
        assert!(page.contains("<p class=\"message\">Successfully signed in</p>"));
    }

    #[test]
    fn test_login_page_escapes_next() {
        let page = login_page(&[], "/\"><script>");
        assert!(!page.contains("\"><script>"));
        assert!(page.contains("name=\"openid\""));
    }

    #[test]
    fn test_profile_pages_prefill_values() {
        let page = create_profile_page(&[], "/", "Armin", "armin@example.com");
        assert!(page.contains("value=\"Armin\""));
        assert!(page.contains("value=\"armin@example.com\""));

        let user = test_user();
        let page = edit_profile_page(&[], &user, &user.name, &user.email);
        assert!(page.contains("name=\"delete\""));
    }
}
