#[cfg(test)]
mod tests {
    use crate::database::entity::post;
    use crate::database::postgres_repo::PostgresPostRepository;
    use chrono::{TimeDelta, Utc};
    use piazza_core::domain::{Interaction, InteractionKind, Post, Topic};
    use piazza_core::error::RepoError;
    use piazza_core::ports::{BaseRepository, PostRepository};
    use piazza_core::query::{TopicFilter, TopicQuery};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use serde_json::json;

    fn post_row(id: uuid::Uuid, version: i64) -> post::Model {
        post_row_at(id, version, 1)
    }

    fn post_row_at(id: uuid::Uuid, version: i64, seq: i64) -> post::Model {
        let now = Utc::now();
        post::Model {
            id,
            author_id: uuid::Uuid::new_v4(),
            author_name: "ana".to_owned(),
            title: "Test Post".to_owned(),
            text: "Content".to_owned(),
            topics: json!(["Tech", "Health"]),
            created_at: now.into(),
            duration_minutes: 10,
            expiration_time: (now + TimeDelta::minutes(10)).into(),
            likes: 1,
            dislikes: 0,
            interest_score: 1,
            interactions: json!([{
                "time": now,
                "kind": "like",
                "actor_id": uuid::Uuid::new_v4(),
                "actor_name": "ben",
                "remaining_at_time": "9 minutes and 59 seconds"
            }]),
            version,
            seq,
        }
    }

    /// SQL and values of every statement the mock connection received.
    fn statements(db: DatabaseConnection) -> String {
        format!("{:?}", db.into_transaction_log())
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let post_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_row(post_id, 3)]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let post = result.expect("post should be found");
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.id, post_id);
        assert_eq!(post.topics, vec![Topic::Tech, Topic::Health]);
        assert_eq!(post.version, 3);

        let ledger: &[Interaction] = &post.interactions;
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].kind, InteractionKind::Like);
        assert_eq!(ledger[0].text, None);
    }

    #[tokio::test]
    async fn test_malformed_topics_column_is_an_error() {
        let post_id = uuid::Uuid::new_v4();
        let mut row = post_row(post_id, 0);
        row.topics = json!(["Cooking"]);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![row]])
            .into_connection();
        let repo = PostgresPostRepository::new(db);

        let result: Result<Option<Post>, RepoError> = repo.find_by_id(post_id).await;
        assert!(matches!(result, Err(RepoError::Query(_))));
    }

    #[tokio::test]
    async fn test_replace_bumps_version() {
        let post_id = uuid::Uuid::new_v4();
        let row = post_row(post_id, 4);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let repo = PostgresPostRepository::new(db);

        let post = Post::try_from(row).unwrap();
        let saved = repo.replace_if_version(post).await.unwrap();
        assert_eq!(saved.version, 5);
    }

    #[tokio::test]
    async fn test_replace_on_stale_version_is_conflict() {
        let post_id = uuid::Uuid::new_v4();
        let row = post_row(post_id, 4);

        // zero rows updated, then the existence probe finds the row
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results(vec![vec![post_row(post_id, 5)]])
            .into_connection();
        let repo = PostgresPostRepository::new(db);

        let post = Post::try_from(row).unwrap();
        let result = repo.replace_if_version(post).await;
        assert!(matches!(result, Err(RepoError::Conflict)));
    }

    #[tokio::test]
    async fn test_delete_of_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();
        let repo = PostgresPostRepository::new(db);

        let result = repo.delete_if_version(uuid::Uuid::new_v4(), 0).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_topic_listing_is_filtered_and_capped_in_sql() {
        let rows: Vec<post::Model> = (1..=5)
            .map(|seq| post_row_at(uuid::Uuid::new_v4(), 0, seq))
            .collect();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![rows])
            .into_connection();
        let repo = PostgresPostRepository::new(db.clone());

        let query = TopicQuery::new(Topic::Tech).with_filter(TopicFilter::Live);
        let posts = repo.find_by_topic(&query, Utc::now()).await.unwrap();
        assert_eq!(posts.len(), 5);

        let log = statements(db);
        assert!(log.contains("@>"));
        assert!(log.contains("expiration_time"));
        assert!(log.contains("LIMIT"));
        assert!(log.contains("BigUnsigned(Some(5))"));
        // same-instant posts fall back to insertion sequence, not the uuid
        assert!(log.contains("created_at\\\" ASC, \\\"posts\\\".\\\"seq\\\" ASC"));
    }

    #[tokio::test]
    async fn test_highest_interest_asks_sql_for_one_live_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_row(uuid::Uuid::new_v4(), 0)]])
            .into_connection();
        let repo = PostgresPostRepository::new(db.clone());

        let query = TopicQuery::new(Topic::Health)
            .with_filter(TopicFilter::Expired)
            .highest_interest();
        let posts = repo.find_by_topic(&query, Utc::now()).await.unwrap();
        assert_eq!(posts.len(), 1);

        let log = statements(db);
        assert!(log.contains("interest_score\\\" DESC"));
        assert!(log.contains("LIMIT"));
        assert!(log.contains("BigUnsigned(Some(1))"));
        assert!(log.contains("expiration_time\\\" > "));
    }
}
