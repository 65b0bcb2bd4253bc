//! The helpdesk backend client.

use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::Response;
use serde::Serialize;
use serde::de::DeserializeOwned;

use helpdesk_core::{CategoryId, TicketId, UserId};

use super::types::{
    AgentsEnvelope, CategoriesEnvelope, Category, CategoryEnvelope, CategoryInput, Credentials,
    ErrorBody, NewAccount, NewTicket, PasswordChange, Ticket, TicketEnvelope, TicketPage,
    TicketUpdate, User, UserEnvelope, UserPage, UserStats, StatsEnvelope, UserUpdate,
};
use super::ApiError;

/// Fallback when a non-success response has no `{error}` body.
const GENERIC_FAILURE: &str = "Request failed";

/// Session credentials for the backend: the cookie pairs it issued at
/// login or registration, replayed on every authenticated call.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ApiSession(String);

impl ApiSession {
    /// Build from the `Set-Cookie` headers of an authentication response.
    fn from_response(response: &Response) -> Self {
        let pairs: Vec<&str> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .collect();
        Self(pairs.join("; "))
    }

    /// Value for the outgoing `Cookie` header.
    #[must_use]
    pub fn cookie_header(&self) -> &str {
        &self.0
    }
}

/// Client for the helpdesk REST backend.
///
/// Cheap to clone; holds only a connection pool and the base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the backend mounted at `base_url`
    /// (e.g. `http://localhost:5000/api`).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Check the response status, turning a non-success response into
    /// [`ApiError::Api`] with the backend's message.
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ErrorBody>()
            .await
            .map_or_else(|_| GENERIC_FAILURE.to_owned(), |body| body.error);
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let checked = Self::check(response).await?;
        checked
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        auth: &ApiSession,
        path: &str,
        pairs: &[(&'static str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .get(self.url(path))
            .query(pairs)
            .header(COOKIE, auth.cookie_header())
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        auth: &ApiSession,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .post(self.url(path))
            .header(COOKIE, auth.cookie_header())
            .json(body)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        auth: &ApiSession,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .put(self.url(path))
            .header(COOKIE, auth.cookie_header())
            .json(body)
            .send()
            .await?;
        Self::parse(response).await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// `POST /auth/login`. Returns the identity and the session credentials
    /// issued by the backend.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with the backend's message on rejected
    /// credentials.
    pub async fn login(&self, credentials: &Credentials) -> Result<(User, ApiSession), ApiError> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(credentials)
            .send()
            .await?;
        let checked = Self::check(response).await?;
        let session = ApiSession::from_response(&checked);
        let envelope: UserEnvelope = checked
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok((envelope.user, session))
    }

    /// `POST /auth/register`. The backend logs the new account in, so this
    /// also returns session credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] when the username or email is taken or the
    /// profile fails backend validation.
    pub async fn register(&self, account: &NewAccount) -> Result<(User, ApiSession), ApiError> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(account)
            .send()
            .await?;
        let checked = Self::check(response).await?;
        let session = ApiSession::from_response(&checked);
        let envelope: UserEnvelope = checked
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok((envelope.user, session))
    }

    /// `POST /auth/logout`.
    ///
    /// # Errors
    ///
    /// Returns an error on backend rejection; callers clear local session
    /// state regardless.
    pub async fn logout(&self, auth: &ApiSession) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("/auth/logout"))
            .header(COOKIE, auth.cookie_header())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// `GET /auth/me`.
    ///
    /// # Errors
    ///
    /// A 401 means the session credentials are no longer valid.
    pub async fn current_user(&self, auth: &ApiSession) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self.get_json(auth, "/auth/me", &[]).await?;
        Ok(envelope.user)
    }

    /// `POST /auth/change-password`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] when the current password is wrong or the
    /// new one fails backend policy.
    pub async fn change_password(
        &self,
        auth: &ApiSession,
        change: &PasswordChange,
    ) -> Result<(), ApiError> {
        let _: serde_json::Value = self.post_json(auth, "/auth/change-password", change).await?;
        Ok(())
    }

    // =========================================================================
    // Tickets
    // =========================================================================

    /// `GET /tickets` with the given query pairs (see
    /// [`TicketFilters::to_pairs`](super::TicketFilters::to_pairs)).
    ///
    /// # Errors
    ///
    /// Propagates backend and transport failures.
    pub async fn list_tickets(
        &self,
        auth: &ApiSession,
        pairs: &[(&'static str, String)],
    ) -> Result<TicketPage, ApiError> {
        self.get_json(auth, "/tickets", pairs).await
    }

    /// `GET /tickets/{id}`, including the comment thread.
    ///
    /// # Errors
    ///
    /// 404 (unknown) and 403 (not authorized) both surface as
    /// [`ApiError::Api`]; the detail view folds them into "not found".
    pub async fn get_ticket(&self, auth: &ApiSession, id: TicketId) -> Result<Ticket, ApiError> {
        let envelope: TicketEnvelope = self.get_json(auth, &format!("/tickets/{id}"), &[]).await?;
        Ok(envelope.ticket)
    }

    /// `POST /tickets`. Always multipart (the backend reads form fields);
    /// the attachment part is present only when a file was uploaded.
    ///
    /// # Errors
    ///
    /// Propagates backend validation failures verbatim.
    pub async fn create_ticket(
        &self,
        auth: &ApiSession,
        ticket: NewTicket,
    ) -> Result<Ticket, ApiError> {
        let mut form = reqwest::multipart::Form::new()
            .text("subject", ticket.subject)
            .text("description", ticket.description)
            .text("category_id", ticket.category_id.to_string())
            .text("priority", ticket.priority.as_str().to_owned());
        if let Some(attachment) = ticket.attachment {
            let part = reqwest::multipart::Part::bytes(attachment.bytes)
                .file_name(attachment.file_name)
                .mime_str(&attachment.content_type)
                .map_err(|e| ApiError::Parse(format!("invalid attachment content type: {e}")))?;
            form = form.part("attachment", part);
        }
        let response = self
            .http
            .post(self.url("/tickets"))
            .header(COOKIE, auth.cookie_header())
            .multipart(form)
            .send()
            .await?;
        let envelope: TicketEnvelope = Self::parse(response).await?;
        Ok(envelope.ticket)
    }

    /// `PUT /tickets/{id}` with only the changed field. Callers re-fetch the
    /// ticket afterwards instead of trusting any locally patched copy.
    ///
    /// # Errors
    ///
    /// Propagates backend rejections (permissions, unknown assignee).
    pub async fn update_ticket(
        &self,
        auth: &ApiSession,
        id: TicketId,
        update: &TicketUpdate,
    ) -> Result<(), ApiError> {
        let _: serde_json::Value = self.put_json(auth, &format!("/tickets/{id}"), update).await?;
        Ok(())
    }

    /// `POST /tickets/{id}/comments`.
    ///
    /// # Errors
    ///
    /// The backend rejects comments from anyone who is neither the creator
    /// nor an agent or admin.
    pub async fn add_comment(
        &self,
        auth: &ApiSession,
        id: TicketId,
        content: &str,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({ "content": content });
        let _: serde_json::Value = self
            .post_json(auth, &format!("/tickets/{id}/comments"), &body)
            .await?;
        Ok(())
    }

    /// `POST /tickets/{id}/vote`. The backend treats repeat votes as an
    /// idempotent toggle per call; the caller re-fetches for the new tally.
    ///
    /// # Errors
    ///
    /// Propagates backend and transport failures.
    pub async fn cast_vote(
        &self,
        auth: &ApiSession,
        id: TicketId,
        is_upvote: bool,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({ "is_upvote": is_upvote });
        let _: serde_json::Value = self
            .post_json(auth, &format!("/tickets/{id}/vote"), &body)
            .await?;
        Ok(())
    }

    /// `DELETE /tickets/{id}/vote`.
    ///
    /// # Errors
    ///
    /// Propagates backend and transport failures.
    pub async fn remove_vote(&self, auth: &ApiSession, id: TicketId) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.url(&format!("/tickets/{id}/vote")))
            .header(COOKIE, auth.cookie_header())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// `GET /categories` — active categories only.
    ///
    /// # Errors
    ///
    /// Propagates backend and transport failures.
    pub async fn list_categories(&self, auth: &ApiSession) -> Result<Vec<Category>, ApiError> {
        let envelope: CategoriesEnvelope = self.get_json(auth, "/categories", &[]).await?;
        Ok(envelope.categories)
    }

    /// `GET /categories?include_inactive=true` — the full roster for the
    /// admin view.
    ///
    /// # Errors
    ///
    /// Propagates backend and transport failures.
    pub async fn list_all_categories(&self, auth: &ApiSession) -> Result<Vec<Category>, ApiError> {
        let pairs = [("include_inactive", "true".to_owned())];
        let envelope: CategoriesEnvelope = self.get_json(auth, "/categories", &pairs).await?;
        Ok(envelope.categories)
    }

    /// `GET /categories/{id}`.
    ///
    /// # Errors
    ///
    /// Propagates backend and transport failures.
    pub async fn get_category(
        &self,
        auth: &ApiSession,
        id: CategoryId,
    ) -> Result<Category, ApiError> {
        let envelope: CategoryEnvelope =
            self.get_json(auth, &format!("/categories/{id}"), &[]).await?;
        Ok(envelope.category)
    }

    /// `POST /categories` (admin only).
    ///
    /// # Errors
    ///
    /// Propagates backend rejections (duplicate name, permissions).
    pub async fn create_category(
        &self,
        auth: &ApiSession,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let envelope: CategoryEnvelope = self.post_json(auth, "/categories", input).await?;
        Ok(envelope.category)
    }

    /// `PUT /categories/{id}` (admin only).
    ///
    /// # Errors
    ///
    /// Propagates backend rejections.
    pub async fn update_category(
        &self,
        auth: &ApiSession,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let envelope: CategoryEnvelope =
            self.put_json(auth, &format!("/categories/{id}"), input).await?;
        Ok(envelope.category)
    }

    /// `DELETE /categories/{id}` (admin only).
    ///
    /// # Errors
    ///
    /// The backend refuses to delete a category that still has tickets.
    pub async fn delete_category(&self, auth: &ApiSession, id: CategoryId) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.url(&format!("/categories/{id}")))
            .header(COOKIE, auth.cookie_header())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// `GET /users` with search/role/page pairs (admin and agents).
    ///
    /// # Errors
    ///
    /// Propagates backend and transport failures.
    pub async fn list_users(
        &self,
        auth: &ApiSession,
        pairs: &[(&'static str, String)],
    ) -> Result<UserPage, ApiError> {
        self.get_json(auth, "/users", pairs).await
    }

    /// `GET /users/{id}`.
    ///
    /// # Errors
    ///
    /// Propagates backend and transport failures.
    pub async fn get_user(&self, auth: &ApiSession, id: UserId) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self.get_json(auth, &format!("/users/{id}"), &[]).await?;
        Ok(envelope.user)
    }

    /// `PUT /users/{id}` (role and active flag).
    ///
    /// # Errors
    ///
    /// Propagates backend rejections.
    pub async fn update_user(
        &self,
        auth: &ApiSession,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self.put_json(auth, &format!("/users/{id}"), update).await?;
        Ok(envelope.user)
    }

    /// `GET /users/agents` — the assignable roster for the detail view.
    ///
    /// # Errors
    ///
    /// Propagates backend and transport failures.
    pub async fn list_agents(&self, auth: &ApiSession) -> Result<Vec<User>, ApiError> {
        let envelope: AgentsEnvelope = self.get_json(auth, "/users/agents", &[]).await?;
        Ok(envelope.agents)
    }

    /// `POST /users/{id}/activate` (admin only).
    ///
    /// # Errors
    ///
    /// Propagates backend rejections.
    pub async fn activate_user(&self, auth: &ApiSession, id: UserId) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .post_json(auth, &format!("/users/{id}/activate"), &serde_json::json!({}))
            .await?;
        Ok(())
    }

    /// `POST /users/{id}/deactivate` (admin only).
    ///
    /// # Errors
    ///
    /// Propagates backend rejections.
    pub async fn deactivate_user(&self, auth: &ApiSession, id: UserId) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .post_json(auth, &format!("/users/{id}/deactivate"), &serde_json::json!({}))
            .await?;
        Ok(())
    }

    /// `GET /users/stats` (admin only).
    ///
    /// # Errors
    ///
    /// Propagates backend and transport failures.
    pub async fn user_stats(&self, auth: &ApiSession) -> Result<UserStats, ApiError> {
        let envelope: StatsEnvelope = self.get_json(auth, "/users/stats", &[]).await?;
        Ok(envelope.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:5000/api/");
        assert_eq!(client.url("/tickets"), "http://localhost:5000/api/tickets");
    }

    #[test]
    fn test_session_cookie_header() {
        let session = ApiSession("session=abc123".to_owned());
        assert_eq!(session.cookie_header(), "session=abc123");
    }
}
