use std::collections::{BTreeSet, HashMap};

use crate::data::post_repository::{NewComment, NewPost, PostPatch, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::post::{
    AddCommentRequest, Author, Comment, CreatePostRequest, Post, UpdatePostRequest,
};

/// A post plus the batch-resolved emails of its commenters. The map only
/// holds resolvable ids; a missing key renders as a null email. Enrichment
/// never touches stored data.
#[derive(Debug, Clone)]
pub(crate) struct EnrichedPost {
    pub(crate) post: Post,
    pub(crate) commenter_emails: HashMap<i64, String>,
}

pub(crate) struct PostService<P: PostRepository, U: UserRepository> {
    posts: P,
    users: U,
}

impl<P: PostRepository, U: UserRepository> PostService<P, U> {
    pub(crate) fn new(posts: P, users: U) -> Self {
        Self { posts, users }
    }

    pub(crate) async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.posts.list_posts().await
    }

    pub(crate) async fn list_my_posts(&self, user_id: i64) -> Result<Vec<Post>, DomainError> {
        self.posts.list_posts_by_owner(user_id).await
    }

    pub(crate) async fn get_post(&self, post_id: i64) -> Result<EnrichedPost, DomainError> {
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;

        let commenter_ids: BTreeSet<i64> =
            post.comments.iter().map(|comment| comment.user_id).collect();
        let commenter_ids: Vec<i64> = commenter_ids.into_iter().collect();
        let commenter_emails = self.users.find_emails(&commenter_ids).await?;

        Ok(EnrichedPost {
            post,
            commenter_emails,
        })
    }

    pub(crate) async fn create_post(
        &self,
        user_id: i64,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        // The author email always comes from the creating user's record;
        // whatever the client sent is discarded before this point.
        let email = self
            .users
            .find_email(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))?;

        let new_post = NewPost {
            user_id,
            author: Author {
                name: req.author_name,
                email,
            },
            title: req.title,
            content: req.content,
            img: req.img,
        };
        self.posts.create_post(new_post).await
    }

    pub(crate) async fn update_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let patch = PostPatch {
            title: req.title,
            content: req.content,
            img: req.img,
            author: req.author,
        };
        self.posts
            .update_post_owned(post_id, actor_user_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))
    }

    pub(crate) async fn delete_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<(), DomainError> {
        let deleted = self.posts.delete_post(post_id, Some(actor_user_id)).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }
        Ok(())
    }

    /// Administrative delete: matches on id alone, no ownership check.
    pub(crate) async fn delete_post_admin(&self, post_id: i64) -> Result<(), DomainError> {
        let deleted = self.posts.delete_post(post_id, None).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }
        Ok(())
    }

    pub(crate) async fn add_comment(
        &self,
        actor_user_id: i64,
        post_id: i64,
        req: AddCommentRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let new_comment = NewComment {
            user_id: actor_user_id,
            body: req.body,
        };
        let appended = self.posts.add_comment(post_id, new_comment).await?;
        if appended.is_none() {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }

        self.posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))
    }

    /// Raw comment list, no email enrichment.
    pub(crate) async fn get_comments(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;
        Ok(post.comments)
    }

    pub(crate) async fn delete_comment(
        &self,
        actor_user_id: i64,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Post, DomainError> {
        // A missing post and a missing (or non-owned) comment both surface as
        // 404, with distinct resource names in the detail.
        self.posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;

        let removed = self
            .posts
            .delete_comment_owned(post_id, comment_id, actor_user_id)
            .await?;
        if !removed {
            return Err(DomainError::NotFound(format!("comment id: {comment_id}")));
        }

        self.posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::PostService;
    use crate::data::post_repository::{NewComment, NewPost, PostPatch, PostRepository};
    use crate::data::user_repository::UserRepository;
    use crate::domain::error::DomainError;
    use crate::domain::post::{
        AddCommentRequest, Author, Comment, CreatePostRequest, Post, UpdatePostRequest,
    };

    #[derive(Clone)]
    struct FakePostRepo {
        created_input: Arc<Mutex<Option<NewPost>>>,
        post_for_get: Arc<Mutex<Option<Post>>>,
        update_owned_result: Arc<Mutex<Option<Post>>>,
        update_owned_call: Arc<Mutex<Option<(i64, i64, PostPatch)>>>,
        delete_result: Arc<Mutex<bool>>,
        delete_call: Arc<Mutex<Option<(i64, Option<i64>)>>>,
        list_result: Arc<Mutex<Vec<Post>>>,
        list_by_owner_call: Arc<Mutex<Option<i64>>>,
        added_comment: Arc<Mutex<Option<(i64, NewComment)>>>,
        add_comment_accepts: Arc<Mutex<bool>>,
        delete_comment_result: Arc<Mutex<bool>>,
        delete_comment_call: Arc<Mutex<Option<(i64, i64, i64)>>>,
    }

    impl FakePostRepo {
        fn new() -> Self {
            Self {
                created_input: Arc::new(Mutex::new(None)),
                post_for_get: Arc::new(Mutex::new(None)),
                update_owned_result: Arc::new(Mutex::new(None)),
                update_owned_call: Arc::new(Mutex::new(None)),
                delete_result: Arc::new(Mutex::new(true)),
                delete_call: Arc::new(Mutex::new(None)),
                list_result: Arc::new(Mutex::new(Vec::new())),
                list_by_owner_call: Arc::new(Mutex::new(None)),
                added_comment: Arc::new(Mutex::new(None)),
                add_comment_accepts: Arc::new(Mutex::new(true)),
                delete_comment_result: Arc::new(Mutex::new(true)),
                delete_comment_call: Arc::new(Mutex::new(None)),
            }
        }
    }

    #[async_trait]
    impl PostRepository for FakePostRepo {
        async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
            Ok(self
                .list_result
                .lock()
                .expect("list_result mutex poisoned")
                .clone())
        }

        async fn list_posts_by_owner(&self, owner_id: i64) -> Result<Vec<Post>, DomainError> {
            *self
                .list_by_owner_call
                .lock()
                .expect("list_by_owner_call mutex poisoned") = Some(owner_id);
            Ok(self
                .list_result
                .lock()
                .expect("list_result mutex poisoned")
                .iter()
                .filter(|post| post.user_id == owner_id)
                .cloned()
                .collect())
        }

        async fn get_post(&self, _id: i64) -> Result<Option<Post>, DomainError> {
            Ok(self
                .post_for_get
                .lock()
                .expect("post_for_get mutex poisoned")
                .clone())
        }

        async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
            *self
                .created_input
                .lock()
                .expect("created_input mutex poisoned") = Some(input.clone());
            Ok(sample_post(1, input.user_id, &input.title, &input.content))
        }

        async fn update_post_owned(
            &self,
            post_id: i64,
            owner_id: i64,
            patch: PostPatch,
        ) -> Result<Option<Post>, DomainError> {
            *self
                .update_owned_call
                .lock()
                .expect("update_owned_call mutex poisoned") = Some((post_id, owner_id, patch));
            Ok(self
                .update_owned_result
                .lock()
                .expect("update_owned_result mutex poisoned")
                .clone())
        }

        async fn delete_post(
            &self,
            post_id: i64,
            owner_id: Option<i64>,
        ) -> Result<bool, DomainError> {
            *self.delete_call.lock().expect("delete_call mutex poisoned") =
                Some((post_id, owner_id));
            Ok(*self
                .delete_result
                .lock()
                .expect("delete_result mutex poisoned"))
        }

        async fn add_comment(
            &self,
            post_id: i64,
            input: NewComment,
        ) -> Result<Option<Comment>, DomainError> {
            if !*self
                .add_comment_accepts
                .lock()
                .expect("add_comment_accepts mutex poisoned")
            {
                return Ok(None);
            }
            let comment = Comment {
                id: 100,
                user_id: input.user_id,
                body: input.body.clone(),
            };
            *self
                .added_comment
                .lock()
                .expect("added_comment mutex poisoned") = Some((post_id, input));
            Ok(Some(comment))
        }

        async fn delete_comment_owned(
            &self,
            post_id: i64,
            comment_id: i64,
            owner_id: i64,
        ) -> Result<bool, DomainError> {
            *self
                .delete_comment_call
                .lock()
                .expect("delete_comment_call mutex poisoned") = Some((post_id, comment_id, owner_id));
            Ok(*self
                .delete_comment_result
                .lock()
                .expect("delete_comment_result mutex poisoned"))
        }
    }

    #[derive(Clone)]
    struct FakeUserRepo {
        emails: Arc<Mutex<HashMap<i64, String>>>,
    }

    impl FakeUserRepo {
        fn new(entries: &[(i64, &str)]) -> Self {
            let emails = entries
                .iter()
                .map(|(id, email)| (*id, email.to_string()))
                .collect();
            Self {
                emails: Arc::new(Mutex::new(emails)),
            }
        }
    }

    #[async_trait]
    impl UserRepository for FakeUserRepo {
        async fn find_email(&self, user_id: i64) -> Result<Option<String>, DomainError> {
            Ok(self
                .emails
                .lock()
                .expect("emails mutex poisoned")
                .get(&user_id)
                .cloned())
        }

        async fn find_emails(
            &self,
            user_ids: &[i64],
        ) -> Result<HashMap<i64, String>, DomainError> {
            let emails = self.emails.lock().expect("emails mutex poisoned");
            Ok(user_ids
                .iter()
                .filter_map(|id| emails.get(id).map(|email| (*id, email.clone())))
                .collect())
        }
    }

    #[tokio::test]
    async fn list_posts_preserves_repository_order() {
        let repo = FakePostRepo::new();
        // Repository contract is newest first; the service must not reorder.
        *repo.list_result.lock().expect("list_result mutex poisoned") = vec![
            sample_post(3, 10, "newest", "body"),
            sample_post(2, 11, "middle", "body"),
            sample_post(1, 10, "oldest", "body"),
        ];

        let users = FakeUserRepo::new(&[]);
        let service = PostService::new(repo, users);

        let posts = service.list_posts().await.expect("list_posts must succeed");
        let ids: Vec<i64> = posts.iter().map(|post| post.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn list_my_posts_passes_caller_and_returns_only_owned_posts() {
        let repo = FakePostRepo::new();
        *repo.list_result.lock().expect("list_result mutex poisoned") = vec![
            sample_post(3, 10, "mine", "body"),
            sample_post(2, 11, "theirs", "body"),
            sample_post(1, 10, "also mine", "body"),
        ];

        let users = FakeUserRepo::new(&[]);
        let service = PostService::new(repo.clone(), users);

        let posts = service
            .list_my_posts(10)
            .await
            .expect("list_my_posts must succeed");
        assert_eq!(posts.len(), 2);
        assert!(posts.iter().all(|post| post.user_id == 10));

        let call = repo
            .list_by_owner_call
            .lock()
            .expect("list_by_owner_call mutex poisoned")
            .expect("owner filter must be captured");
        assert_eq!(call, 10);
    }

    #[tokio::test]
    async fn create_post_resolves_author_email_from_creating_user() {
        let repo = FakePostRepo::new();
        let users = FakeUserRepo::new(&[(10, "a@x.com")]);
        let service = PostService::new(repo.clone(), users);

        let req = CreatePostRequest {
            author_name: "  A  ".to_string(),
            title: "  T  ".to_string(),
            content: "  C  ".to_string(),
            img: None,
        };

        let created = service
            .create_post(10, req)
            .await
            .expect("create_post must succeed");
        assert_eq!(created.user_id, 10);

        let input = repo
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .clone()
            .expect("repo input must be captured");
        assert_eq!(input.author.name, "A");
        assert_eq!(input.author.email, "a@x.com");
        assert_eq!(input.title, "T");
        assert_eq!(input.content, "C");
    }

    #[tokio::test]
    async fn create_post_fails_when_creating_user_is_unknown() {
        let repo = FakePostRepo::new();
        let users = FakeUserRepo::new(&[]);
        let service = PostService::new(repo.clone(), users);

        let req = CreatePostRequest {
            author_name: "A".to_string(),
            title: "T".to_string(),
            content: "C".to_string(),
            img: None,
        };

        let err = service
            .create_post(10, req)
            .await
            .expect_err("unknown user must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(
            repo.created_input
                .lock()
                .expect("created_input mutex poisoned")
                .is_none(),
            "nothing must be persisted"
        );
    }

    #[tokio::test]
    async fn create_post_rejects_empty_title_before_touching_store() {
        let repo = FakePostRepo::new();
        let users = FakeUserRepo::new(&[(10, "a@x.com")]);
        let service = PostService::new(repo.clone(), users);

        let req = CreatePostRequest {
            author_name: "A".to_string(),
            title: "   ".to_string(),
            content: "C".to_string(),
            img: None,
        };

        let err = service
            .create_post(10, req)
            .await
            .expect_err("empty title must fail");
        assert!(matches!(err, DomainError::Validation { .. }));
        assert!(
            repo.created_input
                .lock()
                .expect("created_input mutex poisoned")
                .is_none()
        );
    }

    #[tokio::test]
    async fn get_post_enriches_comments_with_resolvable_emails_only() {
        let repo = FakePostRepo::new();
        let mut post = sample_post(7, 10, "title", "body");
        post.comments = vec![
            sample_comment(1, 20, "first"),
            sample_comment(2, 21, "second"),
        ];
        *repo
            .post_for_get
            .lock()
            .expect("post_for_get mutex poisoned") = Some(post);

        let users = FakeUserRepo::new(&[(20, "b@x.com")]);
        let service = PostService::new(repo, users);

        let enriched = service.get_post(7).await.expect("get_post must succeed");
        assert_eq!(
            enriched.commenter_emails.get(&20).map(String::as_str),
            Some("b@x.com")
        );
        assert!(
            !enriched.commenter_emails.contains_key(&21),
            "unresolved commenter must stay absent"
        );
    }

    #[tokio::test]
    async fn get_post_returns_not_found_when_missing() {
        let repo = FakePostRepo::new();
        let users = FakeUserRepo::new(&[]);
        let service = PostService::new(repo, users);

        let err = service.get_post(42).await.expect_err("post must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_post_uses_conditional_owned_update() {
        let repo = FakePostRepo::new();
        *repo
            .update_owned_result
            .lock()
            .expect("update_owned_result mutex poisoned") = Some(sample_post(7, 10, "new", "body"));

        let users = FakeUserRepo::new(&[]);
        let service = PostService::new(repo.clone(), users);
        let req = UpdatePostRequest {
            title: Some("  new  ".to_string()),
            ..UpdatePostRequest::default()
        };

        let updated = service
            .update_post(10, 7, req)
            .await
            .expect("update must succeed");
        assert_eq!(updated.id, 7);

        let call = repo
            .update_owned_call
            .lock()
            .expect("update_owned_call mutex poisoned")
            .clone()
            .expect("update call must be captured");
        assert_eq!(call.0, 7);
        assert_eq!(call.1, 10);
        assert_eq!(call.2.title.as_deref(), Some("new"));
        assert!(call.2.content.is_none());
        assert!(call.2.img.is_none(), "unprovided img must be retained");
    }

    #[tokio::test]
    async fn update_post_by_non_owner_surfaces_not_found() {
        let repo = FakePostRepo::new();
        // Conditional update misses: id exists but owner differs.
        let users = FakeUserRepo::new(&[]);
        let service = PostService::new(repo, users);

        let err = service
            .update_post(11, 7, UpdatePostRequest::default())
            .await
            .expect_err("non-owner must get not found");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_post_passes_owner_and_maps_miss_to_not_found() {
        let repo = FakePostRepo::new();
        *repo
            .delete_result
            .lock()
            .expect("delete_result mutex poisoned") = false;

        let users = FakeUserRepo::new(&[]);
        let service = PostService::new(repo.clone(), users);

        let err = service
            .delete_post(10, 7)
            .await
            .expect_err("miss must map to not found");
        assert!(matches!(err, DomainError::NotFound(_)));

        let call = repo
            .delete_call
            .lock()
            .expect("delete_call mutex poisoned")
            .expect("delete call must be captured");
        assert_eq!(call, (7, Some(10)));
    }

    #[tokio::test]
    async fn delete_post_admin_deletes_by_id_alone() {
        let repo = FakePostRepo::new();
        let users = FakeUserRepo::new(&[]);
        let service = PostService::new(repo.clone(), users);

        service
            .delete_post_admin(7)
            .await
            .expect("admin delete must succeed");

        let call = repo
            .delete_call
            .lock()
            .expect("delete_call mutex poisoned")
            .expect("delete call must be captured");
        assert_eq!(call, (7, None));
    }

    #[tokio::test]
    async fn add_comment_carries_caller_identity_and_returns_updated_post() {
        let repo = FakePostRepo::new();
        *repo
            .post_for_get
            .lock()
            .expect("post_for_get mutex poisoned") = Some(sample_post(7, 10, "title", "body"));

        let users = FakeUserRepo::new(&[]);
        let service = PostService::new(repo.clone(), users);

        let req = AddCommentRequest {
            body: "  nice post  ".to_string(),
        };
        let post = service
            .add_comment(20, 7, req)
            .await
            .expect("add_comment must succeed");
        assert_eq!(post.id, 7);

        let (post_id, input) = repo
            .added_comment
            .lock()
            .expect("added_comment mutex poisoned")
            .clone()
            .expect("comment must be captured");
        assert_eq!(post_id, 7);
        assert_eq!(input.user_id, 20);
        assert_eq!(input.body, "nice post");
    }

    #[tokio::test]
    async fn add_comment_to_missing_post_returns_not_found() {
        let repo = FakePostRepo::new();
        *repo
            .add_comment_accepts
            .lock()
            .expect("add_comment_accepts mutex poisoned") = false;

        let users = FakeUserRepo::new(&[]);
        let service = PostService::new(repo, users);

        let err = service
            .add_comment(
                20,
                7,
                AddCommentRequest {
                    body: "text".to_string(),
                },
            )
            .await
            .expect_err("missing post must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn get_comments_returns_raw_list_without_enrichment() {
        let repo = FakePostRepo::new();
        let mut post = sample_post(7, 10, "title", "body");
        post.comments = vec![sample_comment(1, 20, "first")];
        *repo
            .post_for_get
            .lock()
            .expect("post_for_get mutex poisoned") = Some(post);

        let users = FakeUserRepo::new(&[(20, "b@x.com")]);
        let service = PostService::new(repo, users);

        let comments = service
            .get_comments(7)
            .await
            .expect("get_comments must succeed");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].body, "first");
    }

    #[tokio::test]
    async fn delete_comment_by_non_owner_surfaces_not_found() {
        let repo = FakePostRepo::new();
        *repo
            .post_for_get
            .lock()
            .expect("post_for_get mutex poisoned") = Some(sample_post(7, 10, "title", "body"));
        *repo
            .delete_comment_result
            .lock()
            .expect("delete_comment_result mutex poisoned") = false;

        let users = FakeUserRepo::new(&[]);
        let service = PostService::new(repo.clone(), users);

        let err = service
            .delete_comment(21, 7, 100)
            .await
            .expect_err("non-owner must get not found");
        assert!(matches!(err, DomainError::NotFound(_)));

        let call = repo
            .delete_comment_call
            .lock()
            .expect("delete_comment_call mutex poisoned")
            .expect("delete call must be captured");
        assert_eq!(call, (7, 100, 21));
    }

    #[tokio::test]
    async fn delete_comment_on_missing_post_returns_not_found() {
        let repo = FakePostRepo::new();
        let users = FakeUserRepo::new(&[]);
        let service = PostService::new(repo.clone(), users);

        let err = service
            .delete_comment(21, 7, 100)
            .await
            .expect_err("missing post must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(
            repo.delete_comment_call
                .lock()
                .expect("delete_comment_call mutex poisoned")
                .is_none(),
            "comment delete must not be attempted"
        );
    }

    fn sample_post(id: i64, user_id: i64, title: &str, content: &str) -> Post {
        Post::new(
            id,
            user_id,
            Author {
                name: "A".to_string(),
                email: "a@x.com".to_string(),
            },
            title.to_string(),
            content.to_string(),
            None,
            Vec::new(),
            Utc::now(),
        )
        .expect("sample post must be valid")
    }

    fn sample_comment(id: i64, user_id: i64, body: &str) -> Comment {
        Comment {
            id,
            user_id,
            body: body.to_string(),
        }
    }
}
