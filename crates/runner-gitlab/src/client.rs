//! GitLab REST v4 implementation of [`GitlabApi`]

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::api::GitlabApi;
use crate::error::{Error, Result};
use crate::types::{AccessLevel, Group, Ident, Member, Project, Runner, User};

const PER_PAGE: &str = "100";

/// Entry of a repository tree listing.
#[derive(Debug, Deserialize)]
struct TreeEntry {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Blocking client for one GitLab instance.
#[derive(Debug, Clone)]
pub struct Gitlab {
    http: Client,
    /// Instance URL without trailing slash, e.g. `https://gitlab.example.com`.
    base_url: String,
    private_token: String,
}

impl Gitlab {
    /// Create a client for the instance at `url` authenticating with a
    /// personal or project access token.
    ///
    /// No request is sent until the first API call.
    pub fn new(url: &str, private_token: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("gitlab-multi-group-runner/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            private_token: private_token.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v4/{}", self.base_url, path)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .header("PRIVATE-TOKEN", &self.private_token)
            .send()?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let message = response.text().unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            url,
            message: message.trim().to_string(),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.endpoint(path);
        debug!("GET {}", url);
        let response = self.send(self.http.get(&url).query(query))?;
        Ok(response.json()?)
    }

    /// GET a list endpoint, following `x-next-page` until the last page.
    fn get_all<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<T>> {
        let url = self.endpoint(path);
        let mut items = Vec::new();
        let mut page = String::from("1");

        loop {
            debug!("GET {} (page {})", url, page);
            let response = {
                let mut params = query.to_vec();
                params.push(("per_page", PER_PAGE));
                params.push(("page", page.as_str()));
                self.send(self.http.get(&url).query(&params))?
            };

            let next = next_page(&response);
            items.extend(response.json::<Vec<T>>()?);

            match next {
                Some(next) => page = next,
                None => return Ok(items),
            }
        }
    }

    fn members(&self, path: &str, minimum_role: AccessLevel) -> Result<Vec<Member>> {
        let members: Vec<Member> = self.get_all(path, &[])?;
        Ok(members
            .into_iter()
            .filter(|member| member.access_level >= minimum_role)
            .collect())
    }
}

fn next_page(response: &Response) -> Option<String> {
    response
        .headers()
        .get("x-next-page")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn split_file_path(file_path: &str) -> (&str, &str) {
    match file_path.rsplit_once('/') {
        Some((directory, name)) => (directory, name),
        None => ("", file_path),
    }
}

impl GitlabApi for Gitlab {
    fn get_project(&self, project: &Ident) -> Result<Project> {
        self.get_json(&format!("projects/{}", project.as_segment()), &[])
            .map_err(|e| {
                e.or_missing(|| Error::NoMatchingProject {
                    ident: project.clone(),
                })
            })
    }

    fn get_group(&self, group: &Ident) -> Result<Group> {
        self.get_json(&format!("groups/{}", group.as_segment()), &[])
            .map_err(|e| {
                e.or_missing(|| Error::NoMatchingGroup {
                    ident: group.clone(),
                })
            })
    }

    fn get_group_projects(&self, group: &Ident) -> Result<Vec<Project>> {
        let listed: Vec<Project> = self
            .get_all(&format!("groups/{}/projects", group.as_segment()), &[])
            .map_err(|e| {
                e.or_missing(|| Error::NoMatchingGroup {
                    ident: group.clone(),
                })
            })?;

        // The listing may omit project settings, fetch each project in full.
        listed
            .iter()
            .map(|project| self.get_project(&Ident::Id(project.id)))
            .collect()
    }

    fn fetch_runner(&self, runner_id: u64) -> Result<Runner> {
        self.get_json(&format!("runners/{}", runner_id), &[])
            .map_err(|e| e.or_missing(|| Error::NoMatchingRunner { id: runner_id }))
    }

    fn get_user(&self, user: &Ident) -> Result<User> {
        let missing = || Error::NoMatchingUser {
            ident: user.clone(),
        };
        match user {
            Ident::Id(id) => self
                .get_json(&format!("users/{}", id), &[])
                .map_err(|e| e.or_missing(missing)),
            Ident::Path(username) => {
                let users: Vec<User> = self
                    .get_json("users", &[("username", username.as_str())])
                    .map_err(|e| e.or_missing(missing))?;
                users.into_iter().next().ok_or_else(missing)
            }
        }
    }

    fn get_project_members(
        &self,
        project: &Project,
        minimum_role: AccessLevel,
    ) -> Result<Vec<Member>> {
        self.members(&format!("projects/{}/members/all", project.id), minimum_role)
    }

    fn get_group_members(&self, group: &Group, minimum_role: AccessLevel) -> Result<Vec<Member>> {
        self.members(&format!("groups/{}/members/all", group.id), minimum_role)
    }

    fn get_project_file(
        &self,
        project: &Project,
        file_path: &str,
        branch: &str,
    ) -> Result<Option<Vec<u8>>> {
        let (directory, file_name) = split_file_path(file_path);
        let mut query = vec![("ref", branch)];
        if !directory.is_empty() {
            query.push(("path", directory));
        }

        let entries: Vec<TreeEntry> =
            match self.get_all(&format!("projects/{}/repository/tree", project.id), &query) {
                Ok(entries) => entries,
                Err(e) if e.is_not_found() => {
                    debug!("{}", e);
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };

        let Some(entry) = entries
            .into_iter()
            .find(|entry| entry.name == file_name && entry.kind == "blob")
        else {
            return Ok(None);
        };

        let url = self.endpoint(&format!(
            "projects/{}/repository/blobs/{}/raw",
            project.id, entry.id
        ));
        debug!("GET {}", url);
        match self.send(self.http.get(&url)) {
            Ok(response) => Ok(Some(response.bytes()?.to_vec())),
            Err(e) if e.is_not_found() => {
                debug!("{}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn list_project_runners(&self, project: &Project) -> Result<Vec<Runner>> {
        self.get_all(&format!("projects/{}/runners", project.id), &[])
    }

    fn enable_runner(&self, runner: &Runner, project: &Project) -> Result<()> {
        let url = self.endpoint(&format!("projects/{}/runners", project.id));
        debug!("POST {}", url);
        self.send(self.http.post(&url).json(&json!({ "runner_id": runner.id })))?;
        Ok(())
    }

    fn set_shared_runners_enabled(&self, project: &Project, enabled: bool) -> Result<()> {
        let url = self.endpoint(&format!("projects/{}", project.id));
        debug!("PUT {}", url);
        self.send(
            self.http
                .put(&url)
                .json(&json!({ "shared_runners_enabled": enabled })),
        )?;
        Ok(())
    }
}
