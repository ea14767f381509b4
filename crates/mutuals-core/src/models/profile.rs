use serde::Deserialize;

/// A profile resolved from its username
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub is_private: bool,
    pub followed_by_viewer: bool,
    pub follower_count: Option<u64>,
}

impl Profile {
    /// Followers of a private profile are only visible to its followers
    pub fn followers_visible(&self) -> bool {
        !self.is_private || self.followed_by_viewer
    }
}

#[derive(Debug, Deserialize)]
pub struct WebProfileInfoResponse {
    pub data: WebProfileInfoData,
}

#[derive(Debug, Deserialize)]
pub struct WebProfileInfoData {
    pub user: Option<WebProfileUser>,
}

#[derive(Debug, Deserialize)]
pub struct WebProfileUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub followed_by_viewer: bool,
    pub edge_followed_by: Option<EdgeCount>,
}

#[derive(Debug, Deserialize)]
pub struct EdgeCount {
    pub count: u64,
}

impl WebProfileUser {
    pub fn to_profile(&self) -> Profile {
        Profile {
            id: self.id.clone(),
            username: self.username.clone(),
            is_private: self.is_private,
            followed_by_viewer: self.followed_by_viewer,
            follower_count: self.edge_followed_by.as_ref().map(|e| e.count),
        }
    }
}

/// Body of `/api/v1/web/accounts/login/ajax/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub authenticated: bool,
    /// `false` when the username does not exist
    #[serde(default)]
    pub user: Option<bool>,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub two_factor_required: bool,
    #[serde(default)]
    pub checkpoint_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
