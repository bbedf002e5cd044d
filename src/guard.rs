// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! Which views a session may open.
//!
//! Decisions are recomputed from the current [`Session`] on every navigation
//! and never cached.

use std::fmt;

use clap::ValueEnum;

use crate::{identity::Role, session::Session};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum View {
    Login,
    Home,
    Empresas,
    Productos,
    Inventario,
}

const ADMIN_ONLY: &[Role] = &[Role::Admin];

impl View {
    pub(crate) const ALL: [Self; 5] = [
        Self::Login,
        Self::Home,
        Self::Empresas,
        Self::Productos,
        Self::Inventario,
    ];

    /// The view a failed guard check or an unknown path lands on when there is
    /// no session.
    pub(crate) const LOGIN: Self = Self::Login;
    /// The view a role mismatch lands on.
    pub(crate) const DEFAULT: Self = Self::Home;

    pub(crate) const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Home => "/home",
            Self::Empresas => "/empresas",
            Self::Productos => "/productos",
            Self::Inventario => "/inventario",
        }
    }

    pub(crate) fn from_path(path: &str) -> Option<Self> {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        Self::ALL.into_iter().find(|view| view.path() == path)
    }

    pub(crate) const fn is_protected(self) -> bool {
        !matches!(self, Self::Login)
    }

    /// Roles allowed in, or `None` for any signed-in role.
    pub(crate) const fn required_roles(self) -> Option<&'static [Role]> {
        match self {
            Self::Productos | Self::Inventario => Some(ADMIN_ONLY),
            Self::Login | Self::Home | Self::Empresas => None,
        }
    }

    /// Roles allowed to change the records shown in the view, or `None` when
    /// reading and writing share the same policy.
    pub(crate) const fn write_roles(self) -> Option<&'static [Role]> {
        match self {
            Self::Empresas => Some(ADMIN_ONLY),
            Self::Login | Self::Home | Self::Productos | Self::Inventario => self.required_roles(),
        }
    }

    /// Views worth offering to `session` in a navigation menu.
    pub(crate) fn menu(session: &Session) -> Vec<Self> {
        if !session.is_authenticated() {
            return vec![Self::Login];
        }
        Self::ALL
            .into_iter()
            .filter(|view| view.is_protected())
            .filter(|view| evaluate(view.required_roles(), session) == Decision::Allow)
            .collect()
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.to_possible_value().ok_or(fmt::Error)?;
        write!(f, "{}", value.get_name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Decision {
    Allow,
    RedirectToLogin,
    RedirectToDefault,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Allow => write!(f, "allowed"),
            Self::RedirectToLogin => write!(f, "sign in first (redirected to {})", View::LOGIN),
            Self::RedirectToDefault => write!(
                f,
                "your role may not open this view (redirected to {})",
                View::DEFAULT
            ),
        }
    }
}

pub(crate) fn evaluate(required_roles: Option<&[Role]>, session: &Session) -> Decision {
    let role = match session.role() {
        Some(role) => role,
        None => return Decision::RedirectToLogin,
    };

    match required_roles {
        Some(roles) if !roles.is_empty() && !roles.contains(&role) => Decision::RedirectToDefault,
        Some(_) | None => Decision::Allow,
    }
}

/// Guards a navigation to `view`. The login view is always open.
pub(crate) fn check(view: View, session: &Session) -> Decision {
    if view.is_protected() {
        evaluate(view.required_roles(), session)
    } else {
        Decision::Allow
    }
}

/// Guards a create, update or delete issued from `view`.
pub(crate) fn check_write(view: View, session: &Session) -> Decision {
    match check(view, session) {
        Decision::Allow => evaluate(view.write_roles(), session),
        decision @ (Decision::RedirectToLogin | Decision::RedirectToDefault) => decision,
    }
}

/// Resolves `path` to the view that ends up displayed. `/` and unknown paths
/// go to the login view.
pub(crate) fn navigate(path: &str, session: &Session) -> View {
    let view = match View::from_path(path) {
        Some(view) => view,
        None => return View::LOGIN,
    };

    match check(view, session) {
        Decision::Allow => view,
        Decision::RedirectToLogin => View::LOGIN,
        Decision::RedirectToDefault => View::DEFAULT,
    }
}

#[cfg(test)]
mod tests {
    use crate::{identity::Credential, testing};

    use super::*;

    fn session(role: Option<&str>) -> Session {
        role.and_then(|role| Credential::parse(testing::token("user@litethinking.com", role)).ok())
            .map_or_else(Session::anonymous, Session::authenticated)
    }

    #[test]
    fn evaluate_matches_the_role_table() {
        let policies: [Option<&[Role]>; 4] = [
            None,
            Some(&[]),
            Some(&[Role::Admin]),
            Some(&[Role::Admin, Role::Viewer]),
        ];

        for policy in policies {
            assert_eq!(evaluate(policy, &session(None)), Decision::RedirectToLogin);

            for (name, role) in [("ADMIN", Role::Admin), ("VIEWER", Role::Viewer)] {
                let expected = match policy {
                    Some(roles) if !roles.is_empty() && !roles.contains(&role) => {
                        Decision::RedirectToDefault
                    }
                    _ => Decision::Allow,
                };
                assert_eq!(evaluate(policy, &session(Some(name))), expected);
            }
        }
    }

    #[test]
    fn admin_may_open_productos_but_viewer_may_not() {
        let admin = session(Some("ADMIN"));
        let viewer = session(Some("VIEWER"));

        assert_eq!(check(View::Productos, &admin), Decision::Allow);
        assert_eq!(check(View::Productos, &viewer), Decision::RedirectToDefault);
        assert_eq!(check(View::Inventario, &viewer), Decision::RedirectToDefault);
        assert_eq!(check(View::Empresas, &viewer), Decision::Allow);
    }

    #[test]
    fn only_admins_may_change_companies() {
        let admin = session(Some("ADMIN"));
        let viewer = session(Some("VIEWER"));

        assert_eq!(check_write(View::Empresas, &admin), Decision::Allow);
        assert_eq!(check_write(View::Empresas, &viewer), Decision::RedirectToDefault);
        assert_eq!(check_write(View::Empresas, &session(None)), Decision::RedirectToLogin);
        assert_eq!(check_write(View::Productos, &viewer), Decision::RedirectToDefault);
        assert_eq!(check_write(View::Productos, &admin), Decision::Allow);
    }

    #[test]
    fn login_is_always_open() {
        assert_eq!(check(View::Login, &session(None)), Decision::Allow);
        assert_eq!(check(View::Home, &session(None)), Decision::RedirectToLogin);
    }

    #[test]
    fn navigation_resolves_redirects() {
        let anonymous = session(None);
        let viewer = session(Some("VIEWER"));
        let admin = session(Some("ADMIN"));

        assert_eq!(navigate("/", &admin), View::Login);
        assert_eq!(navigate("/nowhere", &admin), View::Login);
        assert_eq!(navigate("/empresas", &anonymous), View::Login);
        assert_eq!(navigate("/empresas/", &viewer), View::Empresas);
        assert_eq!(navigate("/inventario", &viewer), View::Home);
        assert_eq!(navigate("/inventario", &admin), View::Inventario);
    }

    #[test]
    fn decisions_follow_session_changes() {
        let mut current = session(Some("ADMIN"));
        assert_eq!(navigate("/productos", &current), View::Productos);

        current = session(Some("VIEWER"));
        assert_eq!(navigate("/productos", &current), View::Home);

        current = Session::anonymous();
        assert_eq!(navigate("/productos", &current), View::Login);
    }

    #[test]
    fn menu_depends_on_role() {
        assert_eq!(View::menu(&session(None)), vec![View::Login]);
        assert_eq!(
            View::menu(&session(Some("VIEWER"))),
            vec![View::Home, View::Empresas]
        );
        assert_eq!(
            View::menu(&session(Some("ADMIN"))),
            vec![View::Home, View::Empresas, View::Productos, View::Inventario]
        );
    }
}
