use serde_json::json;

use textvault::entity::paste::ANONYMOUS_AUTHOR;

use crate::common::{MAX_BLOB_SIZE, TestApp, routes};

mod save {
    use super::*;

    #[tokio::test]
    async fn anonymous_save_returns_a_sixteen_char_hash() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::SAVE, &json!({"content": "hello world"}))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let hash = res.body["hash"].as_str().unwrap();
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_alphanumeric()));

        let row = app.paste_row(hash).await.unwrap();
        assert_eq!(row.author_id, ANONYMOUS_AUTHOR);
        assert!(app.blob_path(hash).exists());
    }

    #[tokio::test]
    async fn authenticated_save_records_the_owner() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "s3cure_P@ss!").await;
        let me = app.get_with_token(routes::VALIDATE, &token).await;

        let hash = app.save_paste(Some(&token), "owned").await;

        let row = app.paste_row(&hash).await.unwrap();
        assert_eq!(row.author_id as i64, me.body["user_id"].as_i64().unwrap());
    }

    #[tokio::test]
    async fn invalid_token_falls_back_to_anonymous() {
        let app = TestApp::spawn().await;

        let res = app
            .post_with_token(routes::SAVE, &json!({"content": "x"}), "not-a-jwt")
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let row = app
            .paste_row(res.body["hash"].as_str().unwrap())
            .await
            .unwrap();
        assert_eq!(row.author_id, ANONYMOUS_AUTHOR);
    }

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::SAVE, &json!({"content": ""}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn missing_content_field_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::SAVE, &json!({"title": "no body"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.post_raw(routes::SAVE, "{\"content\": ").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn oversized_content_is_rejected_before_storing() {
        let app = TestApp::spawn().await;
        let big = "a".repeat(MAX_BLOB_SIZE as usize + 1);

        let res = app
            .post_without_token(routes::SAVE, &json!({"content": big}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod fetch {
    use super::*;

    #[tokio::test]
    async fn saved_paste_reads_back_unchanged() {
        let app = TestApp::spawn().await;
        let content = "fn main() {\n    println!(\"héllo\");\n}\n";

        let hash = app.save_paste(None, content).await;
        let res = app.get_without_token(&routes::get(&hash)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["title"], "snippet");
        assert_eq!(res.body["language"], "rust");
        assert_eq!(res.body["content"], content);
    }

    #[tokio::test]
    async fn absent_title_and_language_come_back_null() {
        let app = TestApp::spawn().await;
        let res = app
            .post_without_token(routes::SAVE, &json!({"content": "bare"}))
            .await;
        let hash = res.body["hash"].as_str().unwrap().to_string();

        let res = app.get_without_token(&routes::get(&hash)).await;

        assert_eq!(res.status, 200);
        assert!(res.body["title"].is_null());
        assert!(res.body["language"].is_null());
        assert_eq!(res.body["content"], "bare");
    }

    #[tokio::test]
    async fn unknown_hash_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::get("AAAAAAAAAAAAAAAA")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let app = TestApp::spawn().await;
        let hash = app.save_paste(None, "cached body").await;

        let first = app.get_without_token(&routes::get(&hash)).await;
        std::fs::remove_file(app.blob_path(&hash)).unwrap();
        let second = app.get_without_token(&routes::get(&hash)).await;

        assert_eq!(second.status, 200, "{}", second.text);
        assert_eq!(first.body, second.body);
        assert_eq!(app.cache.as_ref().unwrap().stats().hits, 1);
    }

    #[tokio::test]
    async fn missing_content_without_cache_is_a_storage_failure() {
        let app = TestApp::spawn_without_cache().await;
        let hash = app.save_paste(None, "soon gone").await;
        std::fs::remove_file(app.blob_path(&hash)).unwrap();

        let res = app.get_without_token(&routes::get(&hash)).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "STORAGE_FAILURE");
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn owner_can_delete_and_paste_is_gone() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "s3cure_P@ss!").await;
        let hash = app.save_paste(Some(&token), "bye").await;
        app.get_without_token(&routes::get(&hash)).await;

        let res = app.delete_with_token(&routes::delete(&hash), &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.text.is_empty());
        assert!(app.paste_row(&hash).await.is_none());
        assert!(!app.blob_path(&hash).exists());

        let res = app.get_without_token(&routes::get(&hash)).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "s3cure_P@ss!").await;
        let hash = app.save_paste(Some(&token), "bye").await;

        let first = app.delete_with_token(&routes::delete(&hash), &token).await;
        assert_eq!(first.status, 200);

        let second = app.delete_with_token(&routes::delete(&hash), &token).await;
        assert_eq!(second.status, 404);
        assert_eq!(second.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn other_user_cannot_delete() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "s3cure_P@ss!").await;
        let bob = app.create_authenticated_user("bob", "hunter2hunter2").await;
        let hash = app.save_paste(Some(&alice), "mine").await;

        let res = app.delete_with_token(&routes::delete(&hash), &bob).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
        let res = app.get_without_token(&routes::get(&hash)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["content"], "mine");
    }

    #[tokio::test]
    async fn anonymous_paste_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "s3cure_P@ss!").await;
        let hash = app.save_paste(None, "nobody's").await;

        let res = app.delete_with_token(&routes::delete(&hash), &token).await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn unknown_hash_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "s3cure_P@ss!").await;

        let res = app
            .delete_with_token(&routes::delete("AAAAAAAAAAAAAAAA"), &token)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn missing_token_is_rejected() {
        let app = TestApp::spawn().await;
        let hash = app.save_paste(None, "x").await;

        let res = app.delete_with_header(&routes::delete(&hash), None).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn malformed_header_is_rejected() {
        let app = TestApp::spawn().await;
        let hash = app.save_paste(None, "x").await;

        let res = app
            .delete_with_header(&routes::delete(&hash), Some("Token abc"))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn invalid_token_is_rejected() {
        let app = TestApp::spawn().await;
        let hash = app.save_paste(None, "x").await;

        let res = app
            .delete_with_token(&routes::delete(&hash), "not-a-jwt")
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
        assert!(app.paste_row(&hash).await.is_some());
    }
}
