use super::handlers::{env_check, health, me, stories, story_generation, test_env, test_redis};
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Routes added outside (`/`, `/sso-callback`, `OPTIONS /health`) are not
/// documented.
pub(crate) fn api_router() -> OpenApiRouter {
    OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(env_check::env_check))
        .routes(routes!(test_env::test_env))
        .routes(routes!(test_redis::test_redis))
        .routes(routes!(stories::list_stories))
        .routes(routes!(story_generation::test_story_generation))
        .routes(routes!(me::me))
}

fn tags() -> Vec<Tag> {
    [
        ("health", "Service health"),
        ("stories", "Personalized story generation"),
        ("diagnostics", "Configuration and dependency checks"),
        ("me", "Signed-in user"),
    ]
    .into_iter()
    .map(|(name, description)| {
        let mut tag = Tag::new(name);
        tag.description = Some(description.to_string());
        tag
    })
    .collect()
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = cargo_license();

    OpenApiBuilder::new().info(info).tags(Some(tags())).build()
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let authors = env!("CARGO_PKG_AUTHORS");
    let primary = authors.split(';').next().map(str::trim)?;
    if primary.is_empty() {
        return None;
    }

    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    fn non_empty(s: &str) -> Option<&str> {
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }

    match author.split_once('<') {
        Some((name, email)) => (
            non_empty(name.trim()),
            non_empty(email.trim_end_matches('>').trim()),
        ),
        None => (non_empty(author.trim()), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));

        let contact = spec.info.contact;
        assert!(contact.is_some());
        if let Some(contact) = contact {
            assert_eq!(contact.name.as_deref(), Some("Team Taleweaver"));
            assert_eq!(contact.email.as_deref(), Some("team@taleweaver.dev"));
        }

        assert_eq!(
            spec.info.license.map(|l| l.name),
            Some("BSD-3-Clause".to_string())
        );
    }

    #[test]
    fn openapi_documents_api_routes() {
        let spec = openapi();
        for path in [
            "/health",
            "/api/env-check",
            "/api/test-env",
            "/api/test-redis",
            "/api/stories",
            "/api/test-story-generation",
            "/api/me",
        ] {
            assert!(spec.paths.paths.contains_key(path), "{path} not documented");
        }
        assert!(!spec.paths.paths.contains_key("/sso-callback"));

    }

    #[test]
    fn openapi_tags_cover_every_operation() {
        let spec = openapi();
        let tags: Vec<String> = spec
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|tag| tag.name)
            .collect();

        for name in ["health", "stories", "diagnostics", "me"] {
            assert!(tags.iter().any(|tag| tag == name), "{name} tag missing");
        }

        for (path, item) in &spec.paths.paths {
            for operation in [&item.get, &item.post].into_iter().flatten() {
                for tag in operation.tags.iter().flatten() {
                    assert!(tags.contains(tag), "{path} uses undeclared tag {tag}");
                }
            }
        }
    }

    #[test]
    fn author_parsing() {
        assert_eq!(
            parse_author("Team Taleweaver <team@taleweaver.dev>"),
            (Some("Team Taleweaver"), Some("team@taleweaver.dev"))
        );
        assert_eq!(parse_author("solo"), (Some("solo"), None));
        assert_eq!(parse_author("<x@y.z>"), (None, Some("x@y.z")));
    }
}
