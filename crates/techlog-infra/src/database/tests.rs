#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeDelta, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use uuid::Uuid;

    use crate::database::entity::{notification_preference, post, post_tag, recent_view, user};
    use crate::database::postgres::{
        PostgresBookmarkRepository, PostgresNotificationRepository, PostgresPostRepository,
        PostgresRecentViewRepository, PostgresUserRepository,
    };
    use techlog_core::domain::{Bookmark, PostFilter, RecentView, User};
    use techlog_core::pagination::PageRequest;
    use techlog_core::ports::{
        BookmarkRepository, NotificationRepository, PostRepository, RecentViewRepository,
        UserRepository,
    };

    fn post_model(id: Uuid, title: &str) -> post::Model {
        let now = Utc::now();
        post::Model {
            id,
            company_id: Uuid::new_v4(),
            title: title.to_owned(),
            url: format!("https://blog.example.com/{title}"),
            summary: Some("summary".to_owned()),
            author: None,
            published_at: now.into(),
            scraped_at: now.into(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn tag_row(post_id: Uuid, tag: &str) -> post_tag::Model {
        post_tag::Model {
            post_id,
            tag: tag.to_owned(),
        }
    }

    /// Row shape produced by SeaORM's COUNT wrapper query.
    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    #[tokio::test]
    async fn find_post_by_id_attaches_sorted_tags() {
        let post_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_model(post_id, "Kafka at scale")]])
            .append_query_results([vec![tag_row(post_id, "kafka"), tag_row(post_id, "backend")]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let post = repo.find_by_id(post_id).await.unwrap().unwrap();

        assert_eq!(post.title, "Kafka at scale");
        assert_eq!(post.tags, vec!["backend", "kafka"]);
    }

    #[tokio::test]
    async fn list_reports_totals_from_the_count_query() {
        let post_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(41)]])
            .append_query_results([vec![post_model(post_id, "Week in infra")]])
            .append_query_results([vec![tag_row(post_id, "rust")]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let page = repo
            .list(&PostFilter::default(), PageRequest::new(2, 20))
            .await
            .unwrap();

        assert_eq!(page.total, 41);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].tags, vec!["rust"]);
    }

    #[tokio::test]
    async fn bookmark_add_reports_duplicates() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let repo = PostgresBookmarkRepository::new(db);
        let bookmark = Bookmark::new(Uuid::new_v4(), Uuid::new_v4());

        assert!(repo.add(bookmark.clone()).await.unwrap());
        assert!(!repo.add(bookmark).await.unwrap());
    }

    #[tokio::test]
    async fn record_view_evicts_rows_beyond_the_cap() {
        let user_id = Uuid::new_v4();
        let old = Utc::now() - TimeDelta::days(30);
        let stale = |post: u128| recent_view::Model {
            user_id,
            post_id: Uuid::from_u128(post),
            viewed_at: old.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                // upsert of the fresh view
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                // eviction delete
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                },
            ])
            .append_query_results([vec![stale(1), stale(2)]])
            .into_connection();

        let repo = PostgresRecentViewRepository::new(db.clone());
        repo.record(user_id, RecentView::new(Uuid::new_v4()))
            .await
            .unwrap();

        // upsert, over-cap select, delete
        assert_eq!(db.into_transaction_log().len(), 3);
    }

    #[tokio::test]
    async fn missing_preference_rows_read_as_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<notification_preference::Model>::new()])
            .into_connection();

        let repo = PostgresNotificationRepository::new(db);
        let preference = repo.find_preference(Uuid::new_v4()).await.unwrap();

        assert!(preference.is_none());
    }

    #[tokio::test]
    async fn provider_upsert_returns_the_stored_row() {
        let stored_id = Uuid::new_v4();
        let created = Utc::now() - TimeDelta::days(90);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![user::Model {
                id: stored_id,
                provider: "github".to_owned(),
                provider_subject: "583231".to_owned(),
                email: Some("octocat@github.com".to_owned()),
                display_name: Some("The Octocat".to_owned()),
                avatar_url: None,
                created_at: created.into(),
                updated_at: Utc::now().into(),
            }]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);
        let incoming = User::from_oauth(
            "github".to_owned(),
            "583231".to_owned(),
            Some("octocat@github.com".to_owned()),
            Some("The Octocat".to_owned()),
            None,
        );
        let incoming_id = incoming.id;

        let stored = repo.upsert_by_provider(incoming).await.unwrap();

        // The pre-existing row wins; the freshly generated id is discarded.
        assert_eq!(stored.id, stored_id);
        assert_ne!(stored.id, incoming_id);
    }
}
