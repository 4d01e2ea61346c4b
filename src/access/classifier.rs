use serde::Serialize;
use uuid::Uuid;

use super::routes::{classify_path, is_api_path, RouteClass};
use crate::database::models::Profile;
use crate::types::{OnboardingProgress, OnboardingStep, Role, LOGIN_PATH};

/// Who is making the request, as resolved once per request upstream of the
/// classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    Authenticated(AuthenticatedActor),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedActor {
    pub profile_id: Uuid,
    pub role: Role,
    pub onboarding: OnboardingProgress,
}

impl AuthenticatedActor {
    pub fn new(profile_id: Uuid, role: Role, onboarding: OnboardingProgress) -> Self {
        Self { profile_id, role, onboarding }
    }

    /// Where this actor lands after login or when bounced off a page
    pub fn landing(&self) -> &'static str {
        match (self.role, self.onboarding.next_step()) {
            (Role::User, Some(step)) => step.path(),
            (role, _) => role.home(),
        }
    }
}

impl From<&Profile> for AuthenticatedActor {
    fn from(profile: &Profile) -> Self {
        Self::new(profile.id, profile.role, profile.onboarding())
    }
}

impl Actor {
    pub fn authenticated(&self) -> Option<&AuthenticatedActor> {
        match self {
            Actor::Anonymous => None,
            Actor::Authenticated(actor) => Some(actor),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "location", rename_all = "snake_case")]
pub enum Decision {
    PassThrough,
    Redirect(String),
}

impl Decision {
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Decision::PassThrough)
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Decision::PassThrough => None,
            Decision::Redirect(location) => Some(location),
        }
    }
}

/// Decide pass-through or redirect for `path_and_query`.
///
/// Pure function of the actor and the path: no I/O, no clock. The query
/// string is only used to build the login return target.
pub fn classify(actor: &Actor, path_and_query: &str) -> Decision {
    let path = path_and_query
        .split_once('?')
        .map_or(path_and_query, |(path, _)| path);
    let class = classify_path(path);

    if class == Some(RouteClass::System) {
        return Decision::PassThrough;
    }

    match actor {
        Actor::Anonymous => match class {
            Some(RouteClass::Public) | Some(RouteClass::GuestOnly) => Decision::PassThrough,
            _ => Decision::Redirect(login_redirect(path_and_query)),
        },
        Actor::Authenticated(actor) => {
            if class == Some(RouteClass::GuestOnly) {
                return Decision::Redirect(actor.landing().to_string());
            }
            match actor.role {
                Role::BusinessOwner => business_owner(class),
                Role::User => personal(actor.onboarding, class, path),
                Role::Admin => admin(class),
            }
        }
    }
}

fn business_owner(class: Option<RouteClass>) -> Decision {
    match class {
        Some(RouteClass::Public)
        | Some(RouteClass::BusinessOnly)
        | Some(RouteClass::Shared)
        | Some(RouteClass::Messaging) => Decision::PassThrough,
        // Personal features, onboarding, admin and unclassified paths
        _ => redirect_home(Role::BusinessOwner),
    }
}

fn personal(onboarding: OnboardingProgress, class: Option<RouteClass>, path: &str) -> Decision {
    match onboarding.next_step() {
        Some(next) => match class {
            Some(RouteClass::BusinessOnly) => redirect_home(Role::User),
            Some(RouteClass::Onboarding) => onboarding_in_progress(next, path),
            _ => Decision::Redirect(next.path().to_string()),
        },
        None => match class {
            Some(RouteClass::Public)
            | Some(RouteClass::PersonalOnly)
            | Some(RouteClass::Shared)
            | Some(RouteClass::Messaging) => Decision::PassThrough,
            Some(RouteClass::Onboarding) if is_api_path(path) => Decision::PassThrough,
            _ => redirect_home(Role::User),
        },
    }
}

/// Onboarding pages up to and including the next step are reachable;
/// skipping ahead lands on the next step. The onboarding API stays open.
fn onboarding_in_progress(next: OnboardingStep, path: &str) -> Decision {
    if is_api_path(path) {
        return Decision::PassThrough;
    }
    match OnboardingStep::from_path(path) {
        Some(step) if step <= next => Decision::PassThrough,
        _ => Decision::Redirect(next.path().to_string()),
    }
}

fn admin(class: Option<RouteClass>) -> Decision {
    match class {
        Some(RouteClass::Onboarding) | None => redirect_home(Role::Admin),
        Some(_) => Decision::PassThrough,
    }
}

fn redirect_home(role: Role) -> Decision {
    Decision::Redirect(role.home().to_string())
}

/// `/login?redirect=<path>`, keeping `/` readable and escaping the rest
pub fn login_redirect(path_and_query: &str) -> String {
    format!("{}?redirect={}", LOGIN_PATH, encode_return_target(path_and_query))
}

fn encode_return_target(target: &str) -> String {
    let mut encoded = String::with_capacity(target.len());
    for byte in target.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                encoded.push(byte as char)
            }
            other => encoded.push_str(&format!("%{:02X}", other)),
        }
    }
    encoded
}

/// Recover the return target from a login page query string.
///
/// Only same-origin absolute paths are returned; anything else (a full URL,
/// a protocol-relative `//host` or `/\host`, control characters) is dropped.
pub fn return_target(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "redirect")
        .map(|(_, value)| value.into_owned())
        .filter(|target| is_local_path(target))
}

// Browsers read `\` as `/`, so `/\host` is protocol-relative too.
fn is_local_path(target: &str) -> bool {
    let bytes = target.as_bytes();
    bytes.first() == Some(&b'/')
        && !matches!(bytes.get(1), Some(b'/') | Some(b'\\'))
        && !target.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::routes::ROUTE_TABLE;
    use crate::types::{ADMIN_HOME, BUSINESS_HOME, PERSONAL_HOME};

    fn actor(role: Role, onboarding: OnboardingProgress) -> Actor {
        Actor::Authenticated(AuthenticatedActor::new(Uuid::new_v4(), role, onboarding))
    }

    fn onboarded_user() -> Actor {
        actor(Role::User, OnboardingProgress::finished())
    }

    fn new_user() -> Actor {
        actor(Role::User, OnboardingProgress::default())
    }

    fn owner() -> Actor {
        actor(Role::BusinessOwner, OnboardingProgress::default())
    }

    fn admin_actor() -> Actor {
        actor(Role::Admin, OnboardingProgress::default())
    }

    fn redirect(to: &str) -> Decision {
        Decision::Redirect(to.to_string())
    }

    fn paths_of(class: RouteClass) -> Vec<&'static str> {
        ROUTE_TABLE
            .iter()
            .filter(|rule| rule.class == class)
            .map(|rule| rule.pattern.as_str())
            .collect()
    }

    #[test]
    fn anonymous_is_sent_to_login_with_return_target() {
        assert_eq!(
            classify(&Actor::Anonymous, "/my-businesses"),
            redirect("/login?redirect=/my-businesses")
        );
        assert_eq!(
            classify(&Actor::Anonymous, "/saved?tab=recent&page=2"),
            redirect("/login?redirect=/saved%3Ftab%3Drecent%26page%3D2")
        );
    }

    #[test]
    fn anonymous_return_target_is_recoverable() {
        for original in ["/my-businesses", "/dm/thread 1", "/saved?tab=recent&page=2"] {
            let decision = classify(&Actor::Anonymous, original);
            let location = decision.location().unwrap();
            let query = location.split_once('?').unwrap().1;
            assert_eq!(return_target(query).as_deref(), Some(original));
        }
    }

    #[test]
    fn anonymous_may_browse_public_and_guest_pages() {
        for path in ["/", "/search?q=tacos", "/business/42", "/login", "/signup"] {
            assert_eq!(classify(&Actor::Anonymous, path), Decision::PassThrough, "{}", path);
        }
    }

    #[test]
    fn anonymous_unclassified_is_protected() {
        assert_eq!(
            classify(&Actor::Anonymous, "/secret"),
            redirect("/login?redirect=/secret")
        );
    }

    #[test]
    fn system_paths_bypass_everyone() {
        for actor in [Actor::Anonymous, new_user(), owner(), admin_actor()] {
            assert_eq!(classify(&actor, "/health"), Decision::PassThrough);
            assert_eq!(classify(&actor, "/api/hooks/identity-created"), Decision::PassThrough);
        }
    }

    #[test]
    fn user_never_reaches_business_only_paths() {
        for onboarding in [OnboardingProgress::default(), OnboardingProgress::finished()] {
            let user = actor(Role::User, onboarding);
            for path in paths_of(RouteClass::BusinessOnly) {
                assert_eq!(classify(&user, path), redirect(PERSONAL_HOME), "{}", path);
            }
        }
    }

    #[test]
    fn owner_is_sent_to_dashboard_from_personal_paths() {
        for path in paths_of(RouteClass::PersonalOnly) {
            assert_eq!(classify(&owner(), path), redirect(BUSINESS_HOME), "{}", path);
        }
        assert_eq!(classify(&owner(), "/profile"), redirect(BUSINESS_HOME));
    }

    #[test]
    fn messaging_passes_for_every_signed_in_role() {
        for actor in [onboarded_user(), owner(), admin_actor()] {
            assert_eq!(classify(&actor, "/dm"), Decision::PassThrough);
            assert_eq!(classify(&actor, "/dm/thread-9"), Decision::PassThrough);
        }
    }

    #[test]
    fn owner_passes_business_and_shared_paths() {
        for class in [RouteClass::BusinessOnly, RouteClass::Shared, RouteClass::Messaging] {
            for path in paths_of(class) {
                assert_eq!(classify(&owner(), path), Decision::PassThrough, "{}", path);
            }
        }
    }

    #[test]
    fn unclassified_fails_closed_per_role() {
        assert_eq!(classify(&owner(), "/unknown"), redirect(BUSINESS_HOME));
        assert_eq!(classify(&onboarded_user(), "/unknown"), redirect(PERSONAL_HOME));
        assert_eq!(classify(&admin_actor(), "/unknown"), redirect(ADMIN_HOME));
    }

    #[test]
    fn incomplete_user_goes_to_first_incomplete_step() {
        assert_eq!(classify(&new_user(), "/saved"), redirect("/onboarding/interests"));
        assert_eq!(classify(&new_user(), "/"), redirect("/onboarding/interests"));
        assert_eq!(classify(&new_user(), "/settings"), redirect("/onboarding/interests"));

        let mut progress = OnboardingProgress::default();
        progress.mark(OnboardingStep::Interests);
        let halfway = actor(Role::User, progress);
        assert_eq!(classify(&halfway, "/dm"), redirect("/onboarding/subcategories"));
    }

    #[test]
    fn business_only_blocking_outranks_onboarding() {
        assert_eq!(classify(&new_user(), "/my-businesses"), redirect(PERSONAL_HOME));
    }

    #[test]
    fn incomplete_user_cannot_skip_ahead() {
        let user = new_user();
        assert_eq!(classify(&user, "/onboarding/interests"), Decision::PassThrough);
        assert_eq!(
            classify(&user, "/onboarding/deal-breakers"),
            redirect("/onboarding/interests")
        );
        assert_eq!(classify(&user, "/onboarding"), redirect("/onboarding/interests"));
        assert_eq!(classify(&user, "/api/onboarding/interests"), Decision::PassThrough);

        let mut progress = OnboardingProgress::default();
        progress.mark(OnboardingStep::Interests);
        progress.mark(OnboardingStep::Subcategories);
        let later = actor(Role::User, progress);
        // Revisiting an earlier step is fine
        assert_eq!(classify(&later, "/onboarding/interests"), Decision::PassThrough);
    }

    #[test]
    fn onboarded_user_is_done_with_onboarding_pages() {
        assert_eq!(classify(&onboarded_user(), "/onboarding/interests"), redirect(PERSONAL_HOME));
        assert_eq!(classify(&onboarded_user(), "/api/onboarding"), Decision::PassThrough);
        assert_eq!(classify(&onboarded_user(), "/saved"), Decision::PassThrough);
        assert_eq!(classify(&onboarded_user(), "/settings"), Decision::PassThrough);
    }

    #[test]
    fn signed_in_actors_skip_login_pages() {
        assert_eq!(classify(&onboarded_user(), "/login"), redirect(PERSONAL_HOME));
        assert_eq!(classify(&new_user(), "/signup"), redirect("/onboarding/interests"));
        assert_eq!(classify(&owner(), "/login?redirect=/dm"), redirect(BUSINESS_HOME));
        assert_eq!(classify(&admin_actor(), "/login"), redirect(ADMIN_HOME));
    }

    #[test]
    fn admin_only_paths_are_admin_only() {
        for path in paths_of(RouteClass::AdminOnly) {
            assert_eq!(classify(&admin_actor(), path), Decision::PassThrough);
            assert_eq!(classify(&owner(), path), redirect(BUSINESS_HOME));
            assert_eq!(classify(&onboarded_user(), path), redirect(PERSONAL_HOME));
        }
    }

    #[test]
    fn redirect_destinations_never_loop() {
        let actors = [Actor::Anonymous, new_user(), onboarded_user(), owner(), admin_actor()];
        let mut samples: Vec<&str> = ROUTE_TABLE.iter().map(|r| r.pattern.as_str()).collect();
        samples.extend(["/unknown", "/dm/../admin"]);

        for actor in &actors {
            for path in &samples {
                if let Decision::Redirect(first) = classify(actor, path) {
                    let second = classify(actor, &first);
                    let settled = match second {
                        Decision::PassThrough => true,
                        // The incomplete-user bounce off a business page goes
                        // home first, home then sends to onboarding, which passes
                        Decision::Redirect(ref next) => classify(actor, next).is_pass_through(),
                    };
                    assert!(settled, "{:?} on {} does not settle", actor, path);
                }
            }
        }
    }

    #[test]
    fn classification_is_idempotent() {
        for actor in [Actor::Anonymous, new_user(), onboarded_user(), owner(), admin_actor()] {
            for rule in ROUTE_TABLE {
                let path = rule.pattern.as_str();
                assert_eq!(classify(&actor, path), classify(&actor, path));
            }
        }
    }

    #[test]
    fn landing_depends_on_role_and_progress() {
        let user = AuthenticatedActor::new(Uuid::new_v4(), Role::User, OnboardingProgress::default());
        assert_eq!(user.landing(), "/onboarding/interests");
        let owner = AuthenticatedActor::new(Uuid::new_v4(), Role::BusinessOwner, OnboardingProgress::default());
        assert_eq!(owner.landing(), BUSINESS_HOME);
    }

    #[test]
    fn return_target_rejects_foreign_destinations() {
        assert_eq!(return_target("redirect=https%3A%2F%2Fevil.example"), None);
        assert_eq!(return_target("redirect=%2F%2Fevil.example"), None);
        assert_eq!(return_target("other=1"), None);
        assert_eq!(return_target("redirect=%2Fdm").as_deref(), Some("/dm"));
    }

    #[test]
    fn return_target_rejects_backslash_and_control_characters() {
        assert_eq!(return_target("redirect=%2F%5Cevil.example"), None);
        assert_eq!(return_target("redirect=%2F%5C%5Cevil.example"), None);
        assert_eq!(return_target("redirect=%2Fsaved%0D%0ALocation%3A%20x"), None);
        assert_eq!(return_target("redirect=%2Fsaved%09"), None);
        assert_eq!(
            return_target("redirect=%2Fsearch%3Fq%3Da%5Cb").as_deref(),
            Some("/search?q=a\\b")
        );
    }
}
