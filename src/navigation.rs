use std::fmt;

/// Screens of the application, split into the unauthenticated graph and the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Auth,
    Login,
    Signup,
    Todo,
}

impl Route {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Route::Todo)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Auth => "auth",
            Route::Login => "login",
            Route::Signup => "signup",
            Route::Todo => "todo",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pick the route to show after the login status may have changed.
///
/// Logged in always lands on the task list. Logged out keeps the user wherever they are
/// in the unauthenticated graph, and sends them back to [`Route::Auth`] from the task list.
pub fn resolve_route(current: Route, is_logged_in: bool) -> Route {
    if is_logged_in {
        Route::Todo
    } else if current.is_authenticated() {
        Route::Auth
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logged_in_goes_to_todo() {
        for route in [Route::Auth, Route::Login, Route::Signup, Route::Todo] {
            assert_eq!(resolve_route(route, true), Route::Todo);
        }
    }

    #[test]
    fn test_logged_out_stays_in_auth_graph() {
        assert_eq!(resolve_route(Route::Auth, false), Route::Auth);
        assert_eq!(resolve_route(Route::Login, false), Route::Login);
        assert_eq!(resolve_route(Route::Signup, false), Route::Signup);
        assert_eq!(resolve_route(Route::Todo, false), Route::Auth);
    }
}
