//! Paginated list resource shared by every list screen

use crate::client::ApiClient;
use crate::error::Result;
use birthcare_core::models::{BirthcareApplication, Id, Patient, PatientAdmission, PrenatalVisit};
use birthcare_core::{ListQuery, Page};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// One list endpoint together with its paging, sort and filter state
#[derive(Debug, Clone)]
pub struct PaginatedResource<T> {
    client: ApiClient,
    path: String,
    query: ListQuery,
    last_page: u32,
    _item: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> PaginatedResource<T> {
    pub fn new(client: ApiClient, path: impl Into<String>) -> Self {
        Self::with_query(client, path, ListQuery::default())
    }

    pub fn with_query(client: ApiClient, path: impl Into<String>, query: ListQuery) -> Self {
        Self {
            client,
            path: path.into(),
            query,
            last_page: 1,
            _item: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Last page reported by the most recent fetch
    pub fn last_page(&self) -> u32 {
        self.last_page
    }

    pub fn set_page(&mut self, page: u32) {
        self.query.set_page(page);
    }

    pub fn set_per_page(&mut self, per_page: u32) {
        self.query.set_per_page(per_page);
    }

    pub fn set_status(&mut self, status: Option<String>) {
        self.query.set_status(status);
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.set_search(search);
    }

    pub fn set_sort(&mut self, field: impl Into<String>) {
        self.query.set_sort(field);
    }

    pub fn has_next(&self) -> bool {
        self.query.page < self.last_page
    }

    pub fn has_previous(&self) -> bool {
        self.query.page > 1
    }

    pub fn next_page(&mut self) {
        if self.has_next() {
            self.query.page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.has_previous() {
            self.query.page -= 1;
        }
    }

    /// Fetch the current page.
    ///
    /// When the requested page is past the end (for example after a filter
    /// narrowed the list) the page is clamped and fetched again once.
    pub async fn fetch(&mut self) -> Result<Page<T>> {
        let page: Page<T> = self.client.list(&self.path, &self.query).await?;
        self.last_page = page.last_page.max(1);

        if self.query.page > self.last_page {
            tracing::debug!(
                path = %self.path,
                requested = self.query.page,
                last_page = self.last_page,
                "Requested page past the end, clamping"
            );
            self.query.clamp_to(self.last_page);
            let page: Page<T> = self.client.list(&self.path, &self.query).await?;
            self.last_page = page.last_page.max(1);
            return Ok(page);
        }

        Ok(page)
    }
}

impl PaginatedResource<BirthcareApplication> {
    pub fn applications(client: ApiClient) -> Self {
        Self::new(client, "/api/admin/birthcare-applications")
    }
}

impl PaginatedResource<PatientAdmission> {
    pub fn admissions(client: ApiClient, birthcare_id: Id) -> Self {
        Self::new(
            client,
            format!("/api/birthcare/{}/patient-admissions", birthcare_id),
        )
    }
}

impl PaginatedResource<Patient> {
    pub fn patients(client: ApiClient, birthcare_id: Id) -> Self {
        Self::new(client, format!("/api/birthcare/{}/patients", birthcare_id))
    }
}

impl PaginatedResource<PrenatalVisit> {
    pub fn prenatal_visits(client: ApiClient, birthcare_id: Id) -> Self {
        Self::new(
            client,
            format!("/api/birthcare/{}/prenatal-visits", birthcare_id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;

    fn resource() -> PaginatedResource<PatientAdmission> {
        let client = ApiClient::new(ClientConfig::default()).unwrap();
        PaginatedResource::admissions(client, 3)
    }

    #[test]
    fn test_filters_reset_page() {
        let mut admissions = resource();
        assert_eq!(admissions.path(), "/api/birthcare/3/patient-admissions");

        admissions.set_page(4);
        admissions.set_status(Some("in-labor".to_string()));
        assert_eq!(admissions.query().page, 1);

        admissions.set_page(2);
        admissions.set_search("reyes");
        assert_eq!(admissions.query().page, 1);

        admissions.set_page(5);
        admissions.set_sort("admission_date");
        assert_eq!(admissions.query().page, 1);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut admissions = resource();
        assert!(!admissions.has_previous());
        assert!(!admissions.has_next());
        admissions.next_page();
        assert_eq!(admissions.query().page, 1);

        admissions.last_page = 3;
        admissions.next_page();
        admissions.next_page();
        admissions.next_page();
        assert_eq!(admissions.query().page, 3);
        admissions.previous_page();
        assert_eq!(admissions.query().page, 2);
    }
}
