mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["results"]["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn registration_rejects_blank_fields_with_field_map() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/users", server.base_url))
        .json(&json!({ "email": "", "password": "", "nickname": "" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Invalid Request");
    assert_eq!(body["validation"]["email"][0], "must not be empty");
    assert_eq!(body["validation"]["password"][0], "must not be empty");
    assert_eq!(body["validation"]["nickname"][0], "must not be empty");
    Ok(())
}

#[tokio::test]
async fn register_login_and_profile_lifecycle() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let tag = common::unique_tag();

    let email = format!("a-{}@x.com", tag);
    let nickname = format!("nA{}", &tag[..6]);

    // Register
    let res = client
        .post(format!("{}/users", server.base_url))
        .json(&json!({ "email": email, "password": "1234", "nickname": nickname }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<Value>().await?;
    let user_id = body["results"]["userId"].as_str().unwrap().to_string();
    assert_eq!(body["statusCode"], 201);

    // Same email, different nickname: conflict, never a raw database error
    let res = client
        .post(format!("{}/users", server.base_url))
        .json(&json!({ "email": email, "password": "1234", "nickname": format!("nB{}", &tag[..6]) }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Conflict");

    // Unknown email: not found
    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": format!("missing-{}@x.com", tag), "password": "1234" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "no such email");

    // Wrong password: not found (not unauthorized), with the mismatch message
    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "password does not match");

    // Correct login returns profile and token
    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "1234" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["results"]["userId"], user_id.as_str());
    let token = body["results"]["accessToken"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    // Public profile fetch
    let res = client
        .get(format!("{}/users/{}", server.base_url, user_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["results"]["nickname"], nickname.as_str());

    // Nickname update requires a token
    let renamed = format!("rn{}", &tag[..6]);
    let res = client
        .patch(format!("{}/users/{}", server.base_url, user_id))
        .json(&json!({ "nickname": renamed }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .patch(format!("{}/users/{}", server.base_url, user_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "nickname": renamed }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Withdraw, then the account no longer logs in or resolves
    let res = client
        .delete(format!("{}/users/{}", server.base_url, user_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["results"]["quit"], true);

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "1234" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/users/{}", server.base_url, user_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn duplicate_nickname_is_a_conflict() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let tag = common::unique_tag();

    let nickname = format!("dn{}", &tag[..6]);
    let res = client
        .post(format!("{}/users", server.base_url))
        .json(&json!({ "email": format!("dup-a-{}@x.com", tag), "password": "1234", "nickname": nickname }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Fresh email, taken nickname: conflict
    let res = client
        .post(format!("{}/users", server.base_url))
        .json(&json!({ "email": format!("dup-b-{}@x.com", tag), "password": "1234", "nickname": nickname }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Conflict");
    assert_eq!(body["message"], "email or nickname already in use");

    // Renaming another account onto the taken nickname is the same conflict
    let other_email = format!("dup-c-{}@x.com", tag);
    let res = client
        .post(format!("{}/users", server.base_url))
        .json(&json!({ "email": other_email, "password": "1234", "nickname": format!("dc{}", &tag[..6]) }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<Value>().await?;
    let other_id = body["results"]["userId"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": other_email, "password": "1234" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    let token = body["results"]["accessToken"].as_str().unwrap().to_string();

    let res = client
        .patch(format!("{}/users/{}", server.base_url, other_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "nickname": nickname }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Conflict");
    Ok(())
}

#[tokio::test]
async fn user_search_returns_page_metadata() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let tag = common::unique_tag();

    let email = format!("search-{}@x.com", tag);
    let nickname = format!("sr{}", &tag[..6]);
    let res = client
        .post(format!("{}/users", server.base_url))
        .json(&json!({ "email": email, "password": "pw", "nickname": nickname }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(format!(
            "{}/users/search?email=search-{}&page=0&size=5",
            server.base_url, tag
        ))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["results"]["totalElements"], 1);
    assert_eq!(body["results"]["pageNumber"], 0);
    assert_eq!(body["results"]["isFirst"], true);
    assert_eq!(body["results"]["users"][0]["email"], email.as_str());
    assert!(body["results"]["users"][0]["posts"].is_array());

    // Out-of-range pagination parameters are a validation failure
    let res = client
        .get(format!("{}/users/search?page=-1&size=0", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert!(body["validation"]["page"].is_array());
    assert!(body["validation"]["size"].is_array());
    Ok(())
}
