use gloo::net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{
    endpoints, AdminLoginRequest, ApiError, BackupPayload, CopyNextToCurrentRequest,
    CreateEmployeeRequest, DuplicateWeekRequest, Employee, EmployeeId, EmployeeLoginRequest,
    LoginResponse, NewSlotRequest, NotesUpdateRequest, RestoreResponse, Slot, SlotId,
    SlotIntent, UpdateEmployeeRequest, UpdateSlotRequest, WeekId, WeekNotes, WeekQuery,
    WeekSnapshot,
};

/// Turns a failed status and its body into an [`ApiError`].
type Classifier = fn(u16, &str) -> ApiError;

/// API client for the planning server.
///
/// Every call returns an [`ApiError`] already classified by the HTTP status,
/// so callers only decide how to show it.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Same server, different bearer token
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            base_url: self.base_url.clone(),
            token,
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        endpoints::join(&self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
            None => builder,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(Request::get(&self.url(path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(Request::post(&self.url(path)))
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.authorize(Request::put(&self.url(path)))
    }

    fn patch(&self, path: &str) -> RequestBuilder {
        self.authorize(Request::patch(&self.url(path)))
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.authorize(Request::delete(&self.url(path)))
    }

    async fn check(response: Response, classify: Classifier) -> Result<Response, ApiError> {
        if response.ok() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(classify(status, &body))
    }

    async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check(response, ApiError::from_status).await
    }

    async fn send_with_body<B: Serialize>(
        builder: RequestBuilder,
        body: &B,
    ) -> Result<Response, ApiError> {
        Self::send_json(builder, body, ApiError::from_status).await
    }

    async fn send_json<B: Serialize>(
        builder: RequestBuilder,
        body: &B,
        classify: Classifier,
    ) -> Result<Response, ApiError> {
        let request = builder
            .json(body)
            .map_err(|e| ApiError::Validation(format!("Requête invalide : {}", e)))?;
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check(response, classify).await
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn login_admin(&self, pin: &str) -> Result<LoginResponse, ApiError> {
        let body = AdminLoginRequest {
            pin: pin.to_string(),
        };
        Self::read(Self::send_with_body(self.post(endpoints::ADMIN_LOGIN), &body).await?).await
    }

    pub async fn login_employee(&self, slug: &str) -> Result<LoginResponse, ApiError> {
        let body = EmployeeLoginRequest {
            slug: slug.to_string(),
        };
        Self::read(Self::send_with_body(self.post(endpoints::EMPLOYEE_LOGIN), &body).await?)
            .await
    }

    pub async fn list_employees(&self) -> Result<Vec<Employee>, ApiError> {
        Self::read(Self::send(self.get(endpoints::EMPLOYEES)).await?).await
    }

    pub async fn create_employee(
        &self,
        request: &CreateEmployeeRequest,
    ) -> Result<Employee, ApiError> {
        let builder = self.post(endpoints::EMPLOYEES);
        let response =
            Self::send_json(builder, request, ApiError::from_employee_write_status).await?;
        Self::read(response).await
    }

    pub async fn update_employee(
        &self,
        id: EmployeeId,
        request: &UpdateEmployeeRequest,
    ) -> Result<Employee, ApiError> {
        let builder = self.put(&endpoints::employee(id));
        let response =
            Self::send_json(builder, request, ApiError::from_employee_write_status).await?;
        Self::read(response).await
    }

    pub async fn delete_employee(&self, id: EmployeeId) -> Result<(), ApiError> {
        Self::send(self.delete(&endpoints::employee(id))).await?;
        Ok(())
    }

    /// Fetch the week matching `query`; the server creates it when missing
    pub async fn get_week(&self, query: &WeekQuery) -> Result<WeekSnapshot, ApiError> {
        query
            .validate()
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        let pairs = query.to_query_pairs();
        let builder = self
            .get(endpoints::WEEKS)
            .query(pairs.iter().map(|(key, value)| (*key, value.as_str())));
        Self::read(Self::send(builder).await?).await
    }

    pub async fn create_slot(
        &self,
        week_id: WeekId,
        request: &NewSlotRequest,
    ) -> Result<Slot, ApiError> {
        Self::read(
            Self::send_with_body(self.post(&endpoints::week_slots(week_id)), request).await?,
        )
        .await
    }

    pub async fn update_slot(
        &self,
        week_id: WeekId,
        slot_id: SlotId,
        request: &UpdateSlotRequest,
    ) -> Result<Slot, ApiError> {
        Self::read(
            Self::send_with_body(self.patch(&endpoints::week_slot(week_id, slot_id)), request)
                .await?,
        )
        .await
    }

    pub async fn delete_slot(&self, week_id: WeekId, slot_id: SlotId) -> Result<(), ApiError> {
        Self::send(self.delete(&endpoints::week_slot(week_id, slot_id))).await?;
        Ok(())
    }

    /// Send a grid intent to the matching slot endpoint
    pub async fn execute_intent(
        &self,
        week_id: WeekId,
        intent: &SlotIntent,
    ) -> Result<(), ApiError> {
        match intent {
            SlotIntent::Create(request) => self.create_slot(week_id, request).await.map(|_| ()),
            SlotIntent::Update { slot_id, changes } => {
                self.update_slot(week_id, *slot_id, changes).await.map(|_| ())
            }
            SlotIntent::Delete { slot_id } => self.delete_slot(week_id, *slot_id).await,
        }
    }

    pub async fn update_notes(
        &self,
        week_id: WeekId,
        request: &NotesUpdateRequest,
    ) -> Result<WeekNotes, ApiError> {
        Self::read(
            Self::send_with_body(self.put(&endpoints::week_notes(week_id)), request).await?,
        )
        .await
    }

    /// Get the template week of an employee, creating it when absent
    pub async fn get_or_create_type_week(
        &self,
        employee_id: EmployeeId,
    ) -> Result<WeekSnapshot, ApiError> {
        Self::read(Self::send(self.post(&endpoints::type_week(employee_id))).await?).await
    }

    pub async fn duplicate_week(
        &self,
        type_week_id: WeekId,
        request: &DuplicateWeekRequest,
    ) -> Result<WeekSnapshot, ApiError> {
        Self::read(
            Self::send_with_body(self.post(&endpoints::duplicate_week(type_week_id)), request)
                .await?,
        )
        .await
    }

    pub async fn reset_from_template(&self, week_id: WeekId) -> Result<WeekSnapshot, ApiError> {
        Self::read(Self::send(self.post(&endpoints::reset_from_template(week_id))).await?).await
    }

    pub async fn copy_next_to_current(
        &self,
        request: &CopyNextToCurrentRequest,
    ) -> Result<WeekSnapshot, ApiError> {
        Self::read(
            Self::send_with_body(self.post(endpoints::COPY_NEXT_TO_CURRENT), request).await?,
        )
        .await
    }

    pub async fn backup(&self) -> Result<BackupPayload, ApiError> {
        Self::read(Self::send(self.post(endpoints::BACKUP)).await?).await
    }

    pub async fn restore(&self, payload: &BackupPayload) -> Result<RestoreResponse, ApiError> {
        Self::read(Self::send_with_body(self.post(endpoints::RESTORE), payload).await?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_with_token_keeps_base_url() {
        let client = ApiClient::new("http://localhost:8000/");
        assert!(!client.has_token());
        let authed = client.with_token(Some("abc".to_string()));
        assert!(authed.has_token());
        assert_eq!(authed.url("/weeks"), "http://localhost:8000/weeks");
        assert_eq!(authed.with_token(None), client);
    }
}
