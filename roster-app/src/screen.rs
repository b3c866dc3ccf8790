//! View model of the users screen: the creation form above the user list.

use roster::{exchange::Exchange, Client, QueryOptions, RequestPolicy, Response};
use roster_queries::{
    create_user::create_user,
    get_users::{get_users, get_users::GetUsersGetUsers},
    CreateUser, GetUsers
};

use crate::cache::creation_extensions;
use crate::error::FormError;

pub type User = GetUsersGetUsers;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenState {
    Loading,
    Error { message: String },
    Ready,
    Submitting
}

/// The creation form. Age stays text until submit so partial input can be edited freely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub age: String,
    pub is_married: bool
}

impl UserForm {
    pub fn validate(&self) -> Result<create_user::Variables, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::EmptyName);
        }
        let age = self.age.trim();
        if age.is_empty() {
            return Err(FormError::EmptyAge);
        }
        let age: i32 = age
            .parse()
            .map_err(|_| FormError::InvalidAge(age.to_owned()))?;

        Ok(create_user::Variables {
            name: name.to_owned(),
            age: age.into(),
            is_married: self.is_married
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

pub struct UsersScreen<M: Exchange> {
    client: Client<M>,
    state: ScreenState,
    users: Vec<User>,
    creation_error: Option<String>,
    pub form: UserForm
}

impl<M: Exchange> UsersScreen<M> {
    pub fn new(client: Client<M>) -> Self {
        Self {
            client,
            state: ScreenState::Loading,
            users: Vec::new(),
            creation_error: None,
            form: UserForm::default()
        }
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn creation_error(&self) -> Option<&str> {
        self.creation_error.as_deref()
    }

    pub fn header(&self) -> String {
        format!("User List ({})", self.users.len())
    }

    pub fn can_submit(&self) -> bool {
        self.state == ScreenState::Ready
            && !self.form.name.trim().is_empty()
            && !self.form.age.trim().is_empty()
    }

    /// Load the list for the first time.
    pub async fn mount(&mut self) {
        self.load(RequestPolicy::CacheFirst).await;
    }

    /// Load the list again after a failure. Does nothing in any other state.
    pub async fn retry(&mut self) {
        if matches!(self.state, ScreenState::Error { .. }) {
            self.load(RequestPolicy::NetworkOnly).await;
        }
    }

    async fn load(&mut self, request_policy: RequestPolicy) {
        self.state = ScreenState::Loading;
        let result = self
            .client
            .query_with_options(
                GetUsers,
                get_users::Variables,
                QueryOptions::default().with_request_policy(request_policy)
            )
            .await;

        self.state = match result.map_err(|e| e.to_string()).and_then(users_of) {
            Ok(users) => {
                self.users = users;
                ScreenState::Ready
            }
            Err(message) => {
                tracing::warn!(%message, "failed to load users");
                ScreenState::Error { message }
            }
        };
    }

    /// Validate the form and run `createUser`.
    pub async fn submit(&mut self) -> Result<(), FormError> {
        let variables = self.begin_submit()?;
        self.complete_submit(variables).await;
        Ok(())
    }

    /// Validate the form and switch to `Submitting`. Nothing is sent yet. Only allowed once the
    /// list is `Ready`.
    pub fn begin_submit(&mut self) -> Result<create_user::Variables, FormError> {
        if self.state != ScreenState::Ready {
            return Err(FormError::NotReady);
        }
        let variables = self.form.validate()?;
        self.state = ScreenState::Submitting;
        self.creation_error = None;
        Ok(variables)
    }

    /// Send the mutation. On success the form is cleared and the list shows the new user, on
    /// failure the form is kept and the error is shown next to it.
    pub async fn complete_submit(&mut self, variables: create_user::Variables) {
        let result = self
            .client
            .query_with_options(
                CreateUser,
                variables,
                QueryOptions::default().with_extensions(creation_extensions())
            )
            .await;

        let created = result.map_err(|e| e.to_string()).and_then(|response| {
            if let Some(message) = response.error_message() {
                return Err(message.to_owned());
            }
            response
                .data
                .and_then(|data| data.create_user)
                .ok_or_else(|| "The server did not return the created user".to_owned())
        });

        match created {
            Ok(user) => {
                tracing::info!(id = ?user.id, "user created");
                self.form.clear();
                self.refresh_after_create().await;
            }
            Err(message) => {
                tracing::warn!(%message, "failed to create user");
                self.creation_error = Some(message);
            }
        }
        self.state = ScreenState::Ready;
    }

    /// Show the merged cached list right away, then replace it with a fresh copy from the server.
    async fn refresh_after_create(&mut self) {
        let cached = self
            .client
            .query_with_options(
                GetUsers,
                get_users::Variables,
                QueryOptions::default().with_request_policy(RequestPolicy::CacheOnly)
            )
            .await;
        if let Ok(Response {
            data: Some(get_users::ResponseData {
                get_users: Some(users)
            }),
            ..
        }) = cached
        {
            self.users = users.into_iter().flatten().collect();
        }

        let refetched = self
            .client
            .query_with_options(
                GetUsers,
                get_users::Variables,
                QueryOptions::default().with_request_policy(RequestPolicy::NetworkOnly)
            )
            .await;
        match refetched.map_err(|e| e.to_string()).and_then(users_of) {
            Ok(users) => self.users = users,
            Err(message) => tracing::warn!(%message, "refetching users failed, keeping cached list")
        }
    }

    #[cfg(test)]
    pub(crate) fn set_ready(&mut self, users: Vec<User>) {
        self.users = users;
        self.state = ScreenState::Ready;
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: ScreenState) {
        self.state = state;
    }
}

fn users_of(response: Response<get_users::ResponseData>) -> Result<Vec<User>, String> {
    if let Some(message) = response.error_message() {
        return Err(message.to_owned());
    }
    response
        .data
        .and_then(|data| data.get_users)
        .map(|users| users.into_iter().flatten().collect())
        .ok_or_else(|| "The server returned no users".to_owned())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn form(name: &str, age: &str) -> UserForm {
        UserForm {
            name: name.to_owned(),
            age: age.to_owned(),
            is_married: true
        }
    }

    #[rstest]
    #[case(form("", "30"), FormError::EmptyName)]
    #[case(form("   ", "30"), FormError::EmptyName)]
    #[case(form("Ann", ""), FormError::EmptyAge)]
    #[case(form("Ann", " "), FormError::EmptyAge)]
    #[case(form("Ann", "abc"), FormError::InvalidAge("abc".into()))]
    #[case(form("Ann", "3.5"), FormError::InvalidAge("3.5".into()))]
    #[case(form("Ann", "99999999999"), FormError::InvalidAge("99999999999".into()))]
    fn rejects_invalid_forms(#[case] form: UserForm, #[case] expected: FormError) {
        assert_eq!(form.validate(), Err(expected));
    }

    #[rstest]
    fn trims_valid_input() {
        let variables = form("  Ann ", " 30 ").validate().expect("valid");
        assert_eq!(variables.name, "Ann");
        assert_eq!(variables.age, 30);
        assert!(variables.is_married);
    }

    #[rstest]
    #[case(ScreenState::Loading)]
    #[case(ScreenState::Error { message: "down".into() })]
    #[case(ScreenState::Submitting)]
    #[tokio::test]
    async fn submitting_needs_a_ready_list(#[case] state: ScreenState) {
        let client = crate::build_client("http://127.0.0.1:9").expect("valid url");
        let mut screen = UsersScreen::new(client);
        screen.form = form("Ann", "30");
        screen.set_state(state.clone());

        assert_eq!(screen.submit().await, Err(FormError::NotReady));
        assert_eq!(screen.state(), &state);
        assert_eq!(screen.form, form("Ann", "30"));
    }

    #[rstest]
    fn a_null_list_with_errors_reports_the_server_message() {
        let response = Response::<get_users::ResponseData> {
            debug_info: None,
            data: Some(get_users::ResponseData { get_users: None }),
            errors: Some(vec![roster::Error {
                message: "store down".to_owned(),
                locations: None,
                path: None,
                extensions: None
            }])
        };
        assert_eq!(users_of(response), Err("store down".to_owned()));
    }

    #[rstest]
    fn null_entries_are_left_out_of_the_list() {
        let response = Response::<get_users::ResponseData> {
            debug_info: None,
            data: Some(get_users::ResponseData {
                get_users: Some(vec![
                    None,
                    Some(User {
                        id: Some("1".to_owned()),
                        name: Some("Lee".to_owned()),
                        age: Some(25),
                        is_married: Some(true)
                    })
                ])
            }),
            errors: None
        };
        let users = users_of(response).expect("users");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name.as_deref(), Some("Lee"));
    }

    #[rstest]
    fn clearing_resets_every_field() {
        let mut form = form("Ann", "30");
        form.clear();
        assert_eq!(form, UserForm::default());
    }
}
