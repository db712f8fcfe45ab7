//! In-memory backend gateway with failure injection
//!
//! Behaves like the REST backend closely enough for store and auth tests:
//! posts are listed newest first, favorites live on user rows, uploaded images
//! are kept by object name. Every call is logged, any operation can be made to
//! fail, and any operation can be held in flight to exercise concurrency.

use async_trait::async_trait;
use common::{
    LuminError, LuminResult,
    models::{OutfitPost, UserProfile},
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::gateway::BackendGateway;

const PUBLIC_PREFIX: &str = "memory://outfit-images/";

/// Gateway operations, used to target failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    ListPosts,
    CreatePost,
    DeletePost,
    UpdateFavoriteFlag,
    GetUserFavorites,
    SetUserFavorites,
    UploadImage,
    DeleteImage,
    GetUser,
    CreateUser,
    UpdateUser,
}

/// One recorded gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    ListPosts { page: u32, page_size: u32 },
    CreatePost(Uuid),
    DeletePost(Uuid),
    UpdateFavoriteFlag(Uuid, bool),
    GetUserFavorites(Uuid),
    SetUserFavorites(Uuid, Vec<Uuid>),
    UploadImage(String),
    DeleteImage(String),
    GetUser(Uuid),
    CreateUser(Uuid),
    UpdateUser(Uuid),
}

impl GatewayCall {
    pub fn op(&self) -> GatewayOp {
        match self {
            GatewayCall::ListPosts { .. } => GatewayOp::ListPosts,
            GatewayCall::CreatePost(_) => GatewayOp::CreatePost,
            GatewayCall::DeletePost(_) => GatewayOp::DeletePost,
            GatewayCall::UpdateFavoriteFlag(..) => GatewayOp::UpdateFavoriteFlag,
            GatewayCall::GetUserFavorites(_) => GatewayOp::GetUserFavorites,
            GatewayCall::SetUserFavorites(..) => GatewayOp::SetUserFavorites,
            GatewayCall::UploadImage(_) => GatewayOp::UploadImage,
            GatewayCall::DeleteImage(_) => GatewayOp::DeleteImage,
            GatewayCall::GetUser(_) => GatewayOp::GetUser,
            GatewayCall::CreateUser(_) => GatewayOp::CreateUser,
            GatewayCall::UpdateUser(_) => GatewayOp::UpdateUser,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Failure {
    Network,
    Status(u16),
}

#[derive(Debug, Clone, Copy)]
struct Injected {
    failure: Failure,
    /// Calls let through before failing
    skip: u32,
    /// `None` fails until recovered
    remaining: Option<u32>,
}

#[derive(Debug, Default)]
struct Inner {
    posts: Vec<OutfitPost>,
    users: HashMap<Uuid, UserProfile>,
    images: BTreeMap<String, usize>,
    calls: Vec<GatewayCall>,
    failures: HashMap<GatewayOp, Injected>,
    gates: HashMap<GatewayOp, Arc<Semaphore>>,
}

/// Backend gateway kept entirely in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway pre-populated with posts, listed newest first
    pub fn with_posts(posts: Vec<OutfitPost>) -> Self {
        let gateway = Self::new();
        {
            let mut inner = gateway.lock();
            inner.posts = posts;
            sort_newest_first(&mut inner.posts);
        }
        gateway
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_user(&self, user: UserProfile) {
        self.lock().users.insert(user.id, user);
    }

    pub fn posts(&self) -> Vec<OutfitPost> {
        self.lock().posts.clone()
    }

    pub fn post(&self, id: Uuid) -> Option<OutfitPost> {
        self.lock().posts.iter().find(|p| p.id == id).cloned()
    }

    pub fn user(&self, id: Uuid) -> Option<UserProfile> {
        self.lock().users.get(&id).cloned()
    }

    /// Names of stored images
    pub fn images(&self) -> Vec<String> {
        self.lock().images.keys().cloned().collect()
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls of one operation
    pub fn count(&self, op: GatewayOp) -> usize {
        self.lock().calls.iter().filter(|c| c.op() == op).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Fail every call of `op` as if the network were down, until recovered
    pub fn fail(&self, op: GatewayOp) {
        self.inject(op, Failure::Network, None);
    }

    /// Fail the next call of `op` only
    pub fn fail_once(&self, op: GatewayOp) {
        self.inject(op, Failure::Network, Some(1));
    }

    /// Let `successes` calls of `op` through, then fail the next one only
    pub fn fail_after(&self, op: GatewayOp, successes: u32) {
        self.lock().failures.insert(
            op,
            Injected {
                failure: Failure::Network,
                skip: successes,
                remaining: Some(1),
            },
        );
    }

    /// Answer every call of `op` with a non-success status, until recovered
    pub fn reject(&self, op: GatewayOp, status: u16) {
        self.inject(op, Failure::Status(status), None);
    }

    pub fn recover(&self, op: GatewayOp) {
        self.lock().failures.remove(&op);
    }

    fn inject(&self, op: GatewayOp, failure: Failure, remaining: Option<u32>) {
        self.lock().failures.insert(
            op,
            Injected {
                failure,
                skip: 0,
                remaining,
            },
        );
    }

    /// Hold calls of `op` until permits are added to the returned gate
    ///
    /// Held calls are recorded before they wait.
    pub fn hold(&self, op: GatewayOp) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.lock().gates.insert(op, gate.clone());
        gate
    }

    /// Record the call, wait for its gate, then apply any injected failure
    async fn enter(&self, call: GatewayCall) -> LuminResult<()> {
        let op = call.op();
        let gate = {
            let mut inner = self.lock();
            inner.calls.push(call);
            inner.gates.get(&op).cloned()
        };
        if let Some(gate) = gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| LuminError::NetworkUnavailable(e.to_string()))?;
        }
        self.injected(op)
    }

    fn injected(&self, op: GatewayOp) -> LuminResult<()> {
        let mut inner = self.lock();
        let Some(injected) = inner.failures.get_mut(&op) else {
            return Ok(());
        };
        if injected.skip > 0 {
            injected.skip -= 1;
            return Ok(());
        }
        let failure = injected.failure;
        if let Some(remaining) = injected.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                inner.failures.remove(&op);
            }
        }

        Err(match (failure, op) {
            (Failure::Network, GatewayOp::UploadImage) => {
                LuminError::UploadFailed("injected upload failure".to_string())
            }
            (Failure::Network, _) => {
                LuminError::NetworkUnavailable(format!("injected failure for {:?}", op))
            }
            (Failure::Status(401 | 403), _) => LuminError::AuthenticationRequired,
            (Failure::Status(status), _) => LuminError::RemoteRejected {
                status,
                message: format!("injected rejection for {:?}", op),
            },
        })
    }
}

fn sort_newest_first(posts: &mut [OutfitPost]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
impl BackendGateway for MemoryGateway {
    async fn list_posts(&self, page: u32, page_size: u32) -> LuminResult<Vec<OutfitPost>> {
        self.enter(GatewayCall::ListPosts { page, page_size }).await?;

        let inner = self.lock();
        let start = (page as usize).saturating_mul(page_size as usize);
        Ok(inner
            .posts
            .iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect())
    }

    async fn create_post(&self, post: &OutfitPost) -> LuminResult<()> {
        self.enter(GatewayCall::CreatePost(post.id)).await?;

        let mut inner = self.lock();
        if inner.posts.iter().any(|p| p.id == post.id) {
            return Err(LuminError::RemoteRejected {
                status: 409,
                message: "duplicate key value violates unique constraint".to_string(),
            });
        }
        inner.posts.push(post.clone());
        sort_newest_first(&mut inner.posts);
        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> LuminResult<()> {
        self.enter(GatewayCall::DeletePost(id)).await?;
        self.lock().posts.retain(|p| p.id != id);
        Ok(())
    }

    async fn update_favorite_flag(&self, id: Uuid, is_favorite: bool) -> LuminResult<()> {
        self.enter(GatewayCall::UpdateFavoriteFlag(id, is_favorite)).await?;
        if let Some(post) = self.lock().posts.iter_mut().find(|p| p.id == id) {
            post.is_favorite = is_favorite;
        }
        Ok(())
    }

    async fn get_user_favorites(&self, user_id: Uuid) -> LuminResult<Vec<Uuid>> {
        self.enter(GatewayCall::GetUserFavorites(user_id)).await?;
        self.lock()
            .users
            .get(&user_id)
            .map(|u| u.favorite_outfit_ids.clone())
            .ok_or_else(|| LuminError::NotFound(format!("user {}", user_id)))
    }

    async fn set_user_favorites(&self, user_id: Uuid, outfit_ids: &[Uuid]) -> LuminResult<()> {
        self.enter(GatewayCall::SetUserFavorites(user_id, outfit_ids.to_vec())).await?;
        if let Some(user) = self.lock().users.get_mut(&user_id) {
            user.favorite_outfit_ids = outfit_ids.to_vec();
        }
        Ok(())
    }

    async fn upload_image(&self, bytes: Vec<u8>, name: &str) -> LuminResult<String> {
        self.enter(GatewayCall::UploadImage(name.to_string())).await?;
        self.lock().images.insert(name.to_string(), bytes.len());
        Ok(format!("{}{}", PUBLIC_PREFIX, name))
    }

    async fn delete_image(&self, name: &str) -> LuminResult<()> {
        self.enter(GatewayCall::DeleteImage(name.to_string())).await?;
        self.lock().images.remove(name);
        Ok(())
    }

    fn public_image_prefix(&self) -> String {
        PUBLIC_PREFIX.to_string()
    }

    async fn get_user(&self, id: Uuid) -> LuminResult<Option<UserProfile>> {
        self.enter(GatewayCall::GetUser(id)).await?;
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn create_user(&self, user: &UserProfile) -> LuminResult<()> {
        self.enter(GatewayCall::CreateUser(user.id)).await?;
        self.lock().users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &UserProfile) -> LuminResult<()> {
        self.enter(GatewayCall::UpdateUser(user.id)).await?;
        let mut inner = self.lock();
        let Some(row) = inner.users.get_mut(&user.id) else {
            return Err(LuminError::NotFound(format!("user {}", user.id)));
        };
        row.username = user.username.clone();
        row.profile_image_url = user.profile_image_url.clone();
        row.social_links = user.social_links.clone();
        Ok(())
    }
}
