use postboard_shared::model::{
    Comment, CommentDraft, CommentEdit, CommentId, Post, PostDraft, PostEdit, PostId,
};
use postboard_shared::path::{
    PATH_POSTS, PATH_POSTS_BULK, link_post, link_post_comment, link_post_comment_like,
    link_post_comments, link_post_like, link_post_share,
};
use http::header::ACCEPT;
use reqwest::{Method, RequestBuilder};
use thiserror::Error;
use tracing::{debug, error, trace};

pub mod settings;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum ServerReq {
    AddPost(PostDraft),
    AddPosts(serde_json::Value),
    EditPost(PostEdit),
    AddComment(CommentDraft),
    EditComment(CommentEdit),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ResKind {
    Post,
    Posts,
    Comments,
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerRes {
    Post(Post),
    Posts(Vec<Post>),
    Comments(Vec<Comment>),
    Ok,
}

impl ServerRes {
    pub fn into_post(self) -> Result<Post, ServerErr> {
        match self {
            ServerRes::Post(post) => Ok(post),
            res => Err(ServerErr::unexpected(&res)),
        }
    }

    pub fn into_posts(self) -> Result<Vec<Post>, ServerErr> {
        match self {
            ServerRes::Posts(posts) => Ok(posts),
            res => Err(ServerErr::unexpected(&res)),
        }
    }

    pub fn into_comments(self) -> Result<Vec<Comment>, ServerErr> {
        match self {
            ServerRes::Comments(comments) => Ok(comments),
            res => Err(ServerErr::unexpected(&res)),
        }
    }

    pub fn into_ok(self) -> Result<(), ServerErr> {
        match self {
            ServerRes::Ok => Ok(()),
            res => Err(ServerErr::unexpected(&res)),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServerErr {
    #[error("client err {0}")]
    ClientErr(#[from] ClientErr),

    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected server response {0}")]
    UnexpectedRes(String),
}

impl ServerErr {
    pub fn unexpected(res: &ServerRes) -> Self {
        Self::UnexpectedRes(format!("{res:?}"))
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientErr {
    #[error("failed to deserialize res {0}")]
    ClientDesErr(String),

    #[error("failed to send req {0}")]
    ClientSendErr(String),
}

pub trait Api {
    fn provide_builder(&self, method: Method, path: impl AsRef<str>) -> RequestBuilder;

    fn into_req(
        &self,
        method: Method,
        path: impl AsRef<str>,
        req: ServerReq,
        expect: ResKind,
    ) -> ApiReq {
        ApiReq::from_api(self, method, path, req, expect)
    }

    // posts

    fn get_posts(&self) -> ApiReq {
        self.into_req(Method::GET, PATH_POSTS, ServerReq::None, ResKind::Posts)
    }

    fn get_post(&self, post_id: PostId) -> ApiReq {
        self.into_req(
            Method::GET,
            link_post(post_id),
            ServerReq::None,
            ResKind::Post,
        )
    }

    fn add_post(&self, draft: PostDraft) -> ApiReq {
        self.into_req(
            Method::POST,
            PATH_POSTS,
            ServerReq::AddPost(draft),
            ResKind::Post,
        )
    }

    /// `body` is whatever JSON the user supplied; the backend validates its shape.
    fn add_posts_bulk(&self, body: serde_json::Value) -> ApiReq {
        self.into_req(
            Method::POST,
            PATH_POSTS_BULK,
            ServerReq::AddPosts(body),
            ResKind::Posts,
        )
    }

    fn update_post(&self, edit: PostEdit) -> ApiReq {
        self.into_req(
            Method::PUT,
            link_post(edit.id),
            ServerReq::EditPost(edit),
            ResKind::Post,
        )
    }

    fn delete_post(&self, post_id: PostId) -> ApiReq {
        self.into_req(
            Method::DELETE,
            link_post(post_id),
            ServerReq::None,
            ResKind::Empty,
        )
    }

    fn like_post(&self, post_id: PostId) -> ApiReq {
        self.into_req(
            Method::POST,
            link_post_like(post_id),
            ServerReq::None,
            ResKind::Post,
        )
    }

    fn share_post(&self, post_id: PostId) -> ApiReq {
        self.into_req(
            Method::POST,
            link_post_share(post_id),
            ServerReq::None,
            ResKind::Post,
        )
    }

    // post comment

    fn get_post_comments(&self, post_id: PostId) -> ApiReq {
        self.into_req(
            Method::GET,
            link_post_comments(post_id),
            ServerReq::None,
            ResKind::Comments,
        )
    }

    fn add_post_comment(&self, post_id: PostId, draft: CommentDraft) -> ApiReq {
        self.into_req(
            Method::POST,
            link_post_comments(post_id),
            ServerReq::AddComment(draft),
            ResKind::Post,
        )
    }

    fn update_post_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        content: impl Into<String>,
    ) -> ApiReq {
        self.into_req(
            Method::PUT,
            link_post_comment(post_id, comment_id),
            ServerReq::EditComment(CommentEdit {
                content: content.into(),
            }),
            ResKind::Post,
        )
    }

    fn delete_post_comment(&self, post_id: PostId, comment_id: CommentId) -> ApiReq {
        self.into_req(
            Method::DELETE,
            link_post_comment(post_id, comment_id),
            ServerReq::None,
            ResKind::Post,
        )
    }

    fn like_post_comment(&self, post_id: PostId, comment_id: CommentId) -> ApiReq {
        self.into_req(
            Method::POST,
            link_post_comment_like(post_id, comment_id),
            ServerReq::None,
            ResKind::Post,
        )
    }
}

pub struct ApiReq {
    pub builder: RequestBuilder,
    pub server_req: ServerReq,
    pub expect: ResKind,
}

impl ApiReq {
    pub fn from_api<A>(
        api: &A,
        method: Method,
        path: impl AsRef<str>,
        req: ServerReq,
        expect: ResKind,
    ) -> Self
    where
        A: Api + ?Sized,
    {
        let builder = api.provide_builder(method, path.as_ref());
        ApiReq {
            builder,
            server_req: req,
            expect,
        }
    }

    pub async fn send_native(self) -> Result<ServerRes, ServerErr> {
        send(self.builder, self.server_req, self.expect).await
    }
}

#[derive(Clone, Debug)]
pub struct ApiNative {
    pub origin: String,
    pub client: reqwest::Client,
}

impl Api for ApiNative {
    fn provide_builder(&self, method: Method, path: impl AsRef<str>) -> RequestBuilder {
        let origin = &self.origin;
        let path = path.as_ref();
        let url = format!("{origin}{path}");
        self.client.request(method, url)
    }
}

impl ApiNative {
    /// `origin` is the posts collection url, e.g. `http://localhost:8080/api/posts`.
    pub fn new(origin: impl Into<String>) -> Self {
        let origin: String = origin.into();
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

pub async fn send(
    mut req_builder: RequestBuilder,
    req: ServerReq,
    expect: ResKind,
) -> Result<ServerRes, ServerErr> {
    debug!("CLIENT SEND:\n{req:?}");
    req_builder = req_builder.header(ACCEPT, "application/json");
    if req != ServerReq::None {
        req_builder = req_builder.json(&req);
    }
    let res = req_builder
        .send()
        .await
        .inspect_err(|err| error!("client failed to send {err}"))
        .map_err(|err| ServerErr::from(ClientErr::ClientSendErr(err.to_string())))?;

    let status = res.status();
    let bytes = res
        .bytes()
        .await
        .inspect_err(|err| error!("client byte stream status {status}\nerr: {err}"))
        .map_err(|err| ServerErr::from(ClientErr::ClientDesErr(err.to_string())))?;

    if !status.is_success() {
        let body = String::from_utf8_lossy(&bytes).to_string();
        error!("server responded with {status}: {body}");
        return Err(ServerErr::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body = match expect {
        ResKind::Post => serde_json::from_slice::<Post>(&bytes).map(ServerRes::Post),
        ResKind::Posts => serde_json::from_slice::<Vec<Post>>(&bytes).map(ServerRes::Posts),
        ResKind::Comments => {
            serde_json::from_slice::<Vec<Comment>>(&bytes).map(ServerRes::Comments)
        }
        ResKind::Empty => Ok(ServerRes::Ok),
    }
    .map_err(|err| ServerErr::from(ClientErr::ClientDesErr(err.to_string())));

    trace!("CLIENT RECV:\nstatus: {status}\nexpected: {expect}\n{body:?}");

    body
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use crate::mock::{MockApp, MockRoute};
    use crate::{Api, ApiNative, ClientErr, ServerErr, ServerRes};
    use postboard_shared::model::User;

    #[test]
    fn test_native_origin() {
        let api = ApiNative::new("http://localhost:8080/api/posts/");
        assert_eq!(api.origin, "http://localhost:8080/api/posts");
    }

    #[test(tokio::test)]
    async fn test_add_and_get_post() {
        let app = MockApp::new().await;
        let user = User::new("A", "u1");

        let result = app.api.add_post(user.post_draft("hi")).send_native().await;
        let Ok(ServerRes::Post(post)) = result else {
            panic!("expected post, received {result:?}");
        };
        assert_eq!(post.username, "A");
        assert_eq!(post.content, "hi");

        let result = app.api.get_post(post.id).send_native().await;
        assert_eq!(result, Ok(ServerRes::Post(post.clone())));

        let result = app.api.get_posts().send_native().await;
        assert_eq!(result, Ok(ServerRes::Posts(vec![post])));
    }

    #[test(tokio::test)]
    async fn test_status_err() {
        let app = MockApp::new().await;

        let result = app.api.get_post(404).send_native().await;
        assert!(matches!(result, Err(ServerErr::Status { status: 404, .. })));

        app.state.fail(MockRoute::GetPosts).await;
        let result = app.api.get_posts().send_native().await;
        assert!(matches!(result, Err(ServerErr::Status { status: 500, .. })));
    }

    #[test(tokio::test)]
    async fn test_delete_post_empty_res() {
        let app = MockApp::new().await;
        let user = User::new("A", "u1");
        let Ok(ServerRes::Post(post)) = app.api.add_post(user.post_draft("hi")).send_native().await
        else {
            panic!("failed to add post");
        };

        let result = app.api.delete_post(post.id).send_native().await;
        assert_eq!(result, Ok(ServerRes::Ok));
        assert!(app.state.posts().await.is_empty());
    }

    #[test(tokio::test)]
    async fn test_send_err() {
        let api = ApiNative::new("http://127.0.0.1:1/api/posts");
        let result = api.get_posts().send_native().await;
        assert!(matches!(
            result,
            Err(ServerErr::ClientErr(ClientErr::ClientSendErr(_)))
        ));
    }
}
