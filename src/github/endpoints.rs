// GitHub API endpoint functions.
// Typed access to the followers and following listings.

use reqwest::{Url, header::LINK};

use crate::error::{MutualsError, Result};
use crate::username::Username;

use super::client::{GitHubClient, parse_link_header};
use super::pagination::PageSource;
use super::types::{NextPage, Page, RelationKind, UserRecord};

impl GitHubClient {
    /// Get one page of a user's followers or followees.
    pub async fn get_relation_page(
        &self,
        username: &Username,
        kind: RelationKind,
        page: u32,
        per_page: u32,
    ) -> Result<Page> {
        let params = [
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ];
        let response = self
            .get_with_params(
                &format!("/users/{}/{}", username, kind.path_segment()),
                &params,
            )
            .await?;

        let url = response.url().clone();
        let link = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| MutualsError::Transient(e.to_string()))?;

        parse_page(&body, link.as_deref(), &url)
    }
}

impl PageSource for GitHubClient {
    async fn fetch_page(
        &self,
        username: &Username,
        kind: RelationKind,
        page: u32,
        per_page: u32,
    ) -> Result<Page> {
        self.get_relation_page(username, kind, page, per_page).await
    }
}

/// Decode a listing body and its optional `Link` header.
///
/// `url` is the URL the page was served from; relative links resolve against it.
/// A `rel="next"` link without a readable page number is an error, since
/// stopping there would silently drop every later page.
pub fn parse_page(body: &str, link: Option<&str>, url: &Url) -> Result<Page> {
    let items: Vec<UserRecord> =
        serde_json::from_str(body).map_err(|e| MutualsError::Parse(e.to_string()))?;

    let next = match link {
        Some(value) => {
            let links = parse_link_header(value, url);
            if let Some(last) = links.last {
                tracing::debug!(last_page = last, "listing page count from Link header");
            }
            match links.next {
                Some(page) => NextPage::Next(page),
                None if links.has_next => {
                    return Err(MutualsError::Parse(format!(
                        "next page link without a page number: {}",
                        value
                    )));
                }
                None => NextPage::Last,
            }
        }
        None => NextPage::Unknown,
    };

    Ok(Page::new(items, next))
}
