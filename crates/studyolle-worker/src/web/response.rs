//! HTTP encoding of a [`Reply`]: cookies, flash hand-off and CORS.
//!
//! The Worker copies the result onto a `worker::Response` as is.

use serde_json::Value;

use super::{Body, Reply, SessionChange};

pub const SESSION_COOKIE: &str = "SESSION";
pub const FLASH_COOKIE: &str = "FLASH";
const FLASH_MAX_AGE_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Json(Value),
    Redirect(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub status: u16,
    pub content: Content,
    /// Full `Set-Cookie` header values, in order.
    pub set_cookies: Vec<String>,
}

/// Value of `name` in a `Cookie` request header. Empty values count as absent.
pub fn cookie_value(header: Option<&str>, name: &str) -> Option<String> {
    header?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
        .filter(|v| !v.is_empty())
}

pub fn set_cookie(name: &str, value: &str, max_age: i64) -> String {
    format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}")
}

pub fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Percent-decode a cookie value or path segment.
pub fn decode_component(value: &str) -> String {
    url::form_urlencoded::parse(format!("v={value}").as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

/// The request `Origin`, if it is the application's own origin.
///
/// Sessions ride on cookies, so credentials are only ever allowed for
/// `APP_HOST`; any other origin gets no CORS grant.
pub fn allowed_origin(origin: Option<&str>, app_host: &str) -> Option<String> {
    let origin = origin?.trim();
    let app = url::Url::parse(app_host.trim()).ok()?.origin();
    let requested = url::Url::parse(origin).ok()?.origin();
    (app.is_tuple() && app == requested).then(|| app.ascii_serialization())
}

/// Encode a controller reply.
///
/// Views become `{"view": name, "model": {...}}`. A flash carried over from
/// the previous redirect is added to the model as `message` and its cookie is
/// cleared.
pub fn encode(reply: Reply, incoming_flash: Option<String>, session_ttl_secs: i64) -> Encoded {
    let mut consumed_flash = false;
    let content = match reply.body {
        Body::View { name, mut model } => {
            if let Some(message) = incoming_flash {
                model.entry("message").or_insert(Value::String(message));
                consumed_flash = true;
            }
            Content::Json(serde_json::json!({ "view": name, "model": model }))
        }
        Body::Redirect { location } => Content::Redirect(location),
        Body::Json(value) => Content::Json(value),
    };

    let mut set_cookies = Vec::new();
    match &reply.flash {
        Some(message) => set_cookies.push(set_cookie(
            FLASH_COOKIE,
            &encode_component(message),
            FLASH_MAX_AGE_SECS,
        )),
        None if consumed_flash => set_cookies.push(set_cookie(FLASH_COOKIE, "", 0)),
        None => {}
    }
    match &reply.session {
        SessionChange::Keep => {}
        SessionChange::Start(token) => {
            set_cookies.push(set_cookie(SESSION_COOKIE, token, session_ttl_secs))
        }
        SessionChange::End => set_cookies.push(set_cookie(SESSION_COOKIE, "", 0)),
    }

    Encoded {
        status: reply.status,
        content,
        set_cookies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_on_redirect_sets_short_lived_cookie() {
        let reply = Reply::redirect("/study/rust-101/members").flash("Joined the study.");
        let encoded = encode(reply, None, 3600);

        assert_eq!(encoded.status, 302);
        assert_eq!(
            encoded.content,
            Content::Redirect("/study/rust-101/members".to_string())
        );
        assert_eq!(
            encoded.set_cookies,
            vec!["FLASH=Joined+the+study.; Path=/; HttpOnly; SameSite=Lax; Max-Age=60".to_string()]
        );
    }

    #[test]
    fn next_view_consumes_flash() {
        let sent = encode(Reply::redirect("/").flash("프로필을 수정했습니다."), None, 3600);
        let cookie_header = sent.set_cookies[0].split(';').next().unwrap().to_string();
        let incoming = cookie_value(Some(&cookie_header), FLASH_COOKIE)
            .map(|v| decode_component(&v));
        assert_eq!(incoming.as_deref(), Some("프로필을 수정했습니다."));

        let encoded = encode(Reply::view("settings/profile"), incoming, 3600);
        let Content::Json(body) = &encoded.content else {
            panic!("expected a view body");
        };
        assert_eq!(body["view"], "settings/profile");
        assert_eq!(body["model"]["message"], "프로필을 수정했습니다.");
        assert_eq!(
            encoded.set_cookies,
            vec!["FLASH=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0".to_string()]
        );
    }

    #[test]
    fn json_reply_keeps_incoming_flash() {
        let encoded = encode(Reply::ok(), Some("pending".to_string()), 3600);
        assert!(encoded.set_cookies.is_empty());
    }

    #[test]
    fn session_start_and_end() {
        let started = encode(Reply::redirect("/").start_session("tok".to_string()), None, 1209600);
        assert_eq!(
            started.set_cookies,
            vec!["SESSION=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=1209600".to_string()]
        );

        let ended = encode(Reply::redirect("/").end_session(), None, 1209600);
        assert_eq!(
            ended.set_cookies,
            vec!["SESSION=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0".to_string()]
        );
    }

    #[test]
    fn korean_study_path_decodes() {
        let segment = crate::util::encode_path("스터디-모임");
        assert_eq!(segment, "%EC%8A%A4%ED%84%B0%EB%94%94-%EB%AA%A8%EC%9E%84");
        assert_eq!(decode_component(&segment), "스터디-모임");
    }

    #[test]
    fn cookie_lookup_ignores_other_cookies_and_empty_values() {
        let header = "theme=dark; SESSION=abc; FLASH=";
        assert_eq!(cookie_value(Some(header), SESSION_COOKIE).as_deref(), Some("abc"));
        assert_eq!(cookie_value(Some(header), FLASH_COOKIE), None);
        assert_eq!(cookie_value(None, SESSION_COOKIE), None);
    }

    #[test]
    fn cors_only_grants_app_origin() {
        let app = "https://studyolle.example/";
        assert_eq!(
            allowed_origin(Some("https://studyolle.example"), app).as_deref(),
            Some("https://studyolle.example")
        );
        assert_eq!(allowed_origin(Some("https://evil.example"), app), None);
        assert_eq!(allowed_origin(Some("http://studyolle.example"), app), None);
        assert_eq!(allowed_origin(Some("null"), app), None);
        assert_eq!(allowed_origin(None, app), None);
    }
}
