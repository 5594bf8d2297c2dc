//! Article pages end to end: listing, writing, searching, images and the
//! two-step gate on destroy.

mod common;

use common::TestClient;
use hyper::StatusCode;
use lectern_db::{Article, Comment, CommentForm, Image};
use rstest::rstest;

const BODY: &str = "A body long enough to pass validation.";

#[rstest]
#[tokio::test]
async fn test_anonymous_write_redirects_to_sign_in() {
	// Arrange
	let client = TestClient::new().await;

	// Act
	let new_page = client.get("/articles/new").await;
	let create = client
		.post_form(
			"/articles",
			&[("article[title]", "Sneaky"), ("article[body]", BODY)],
		)
		.await;

	// Assert
	for response in [&new_page, &create] {
		assert_eq!(response.status, StatusCode::SEE_OTHER);
		assert_eq!(response.location(), Some("/users/sign_in"));
	}
	let sign_in = client.get("/users/sign_in").await;
	assert!(sign_in.text().contains("You need to sign in or sign up before continuing."));
	assert_eq!(Article::public_count(&client.state().pool).await.unwrap(), 0);
}

#[rstest]
#[tokio::test]
async fn test_create_then_show() {
	// Arrange
	let client = TestClient::signed_in().await;
	let category = client.create_category("Rust").await;

	// Act
	let id = client.create_article("Ownership", BODY, category, "public").await;
	let page = client.get(&format!("/articles/{}", id)).await;

	// Assert
	assert_eq!(page.status, StatusCode::OK);
	let html = page.text();
	assert!(html.contains("<h1>Ownership</h1>"));
	assert!(html.contains("Article was successfully created."));
	assert!(html.contains("Filed under"));
	assert!(html.contains("Our blog has 1 articles and counting!"));
}

#[rstest]
#[tokio::test]
async fn test_invalid_article_renders_errors() {
	// Arrange
	let client = TestClient::signed_in().await;
	let category = client.create_category("Rust").await.to_string();

	// Act
	let response = client
		.post_form(
			"/articles",
			&[
				("article[title]", "Short"),
				("article[body]", "too short"),
				("article[category_id]", &category),
			],
		)
		.await;

	// Assert
	assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
	assert!(response.text().contains("Body is too short (minimum is 10 characters)"));
	assert_eq!(Article::public_count(&client.state().pool).await.unwrap(), 0);
}

#[rstest]
#[tokio::test]
async fn test_update_through_method_override() {
	// Arrange
	let client = TestClient::signed_in().await;
	let category = client.create_category("Rust").await;
	let id = client.create_article("Draft title", BODY, category, "public").await;

	// Act
	let response = client
		.post_form(
			&format!("/articles/{}", id),
			&[("_method", "patch"), ("article[title]", "Final title")],
		)
		.await;

	// Assert
	assert_eq!(response.status, StatusCode::SEE_OTHER);
	let article = Article::find(&client.state().pool, id).await.unwrap();
	assert_eq!(article.title, "Final title");
	assert_eq!(article.body, BODY);
}

#[rstest]
#[tokio::test]
async fn test_anonymous_update_redirects_to_sign_in() {
	// Arrange
	let client = TestClient::signed_in().await;
	let category = client.create_category("Rust").await;
	let id = client.create_article("Draft title", BODY, category, "public").await;
	client.get("/users/sign_out").await;

	// Act
	let response = client
		.post_form(
			&format!("/articles/{}", id),
			&[("_method", "patch"), ("article[title]", "Defaced title")],
		)
		.await;

	// Assert
	assert_eq!(response.status, StatusCode::SEE_OTHER);
	assert_eq!(response.location(), Some("/users/sign_in"));
	let article = Article::find(&client.state().pool, id).await.unwrap();
	assert_eq!(article.title, "Draft title");
	assert_eq!(article.body, BODY);
}

#[rstest]
#[tokio::test]
async fn test_index_paginates_newest_first() {
	// Arrange
	let client = TestClient::signed_in().await;
	let category = client.create_category("Rust").await;
	for n in 1..=10 {
		client
			.create_article(&format!("Article {}", n), BODY, category, "public")
			.await;
	}
	client.get("/").await;

	// Act
	let first = client.get("/").await.text();
	let second = client.get("/articles?page=2").await.text();
	let past_end = client.get("/articles?page=9").await.text();

	// Assert
	assert!(first.contains("Article 10<"));
	assert!(first.contains("Article 6<"));
	assert!(!first.contains("Article 5<"));
	assert!(first.contains("Page 1 of 2"));
	assert!(second.contains("Page 2 of 2"));
	let five = second.find("Article 5<").unwrap();
	let four = second.find("Article 4<").unwrap();
	assert!(five < four);
	assert!(!second.contains("Article 6<"));
	assert!(past_end.contains("No articles."));
}

#[rstest]
#[case("archived", false)]
#[case("private", true)]
#[case("public", true)]
#[tokio::test]
async fn test_visibility_for_anonymous_readers(#[case] status: &str, #[case] visible: bool) {
	// Arrange
	let client = TestClient::signed_in().await;
	let category = client.create_category("Rust").await;
	let id = client.create_article("Hidden or not", BODY, category, status).await;
	client.get("/users/sign_out").await;

	// Act
	let listing = client.get("/").await.text();
	let page = client.get(&format!("/articles/{}", id)).await;

	// Assert
	assert_eq!(listing.contains("Hidden or not"), visible);
	let expected = if visible { StatusCode::OK } else { StatusCode::NOT_FOUND };
	assert_eq!(page.status, expected);
}

#[rstest]
#[tokio::test]
async fn test_destroy_requires_basic_auth() {
	// Arrange
	let client = TestClient::signed_in().await;
	let category = client.create_category("Rust").await;
	let id = client.create_article("Keep me", BODY, category, "public").await;

	// Act
	let response = client.delete(&format!("/articles/{}", id)).await;

	// Assert
	assert_eq!(response.status, StatusCode::UNAUTHORIZED);
	assert_eq!(
		response.headers.get("www-authenticate").unwrap(),
		"Basic realm=\"Application\""
	);
	assert_eq!(response.text(), "HTTP Basic: Access denied.\n");
	assert!(Article::find(&client.state().pool, id).await.is_ok());
}

#[rstest]
#[tokio::test]
async fn test_destroy_with_wrong_credentials() {
	// Arrange
	let mut client = TestClient::signed_in().await;
	let category = client.create_category("Rust").await;
	let id = client.create_article("Keep me", BODY, category, "public").await;
	client.credentials("dhh", "guess");

	// Act
	let response = client.delete(&format!("/articles/{}", id)).await;

	// Assert
	assert_eq!(response.status, StatusCode::UNAUTHORIZED);
	assert!(Article::find(&client.state().pool, id).await.is_ok());
}

#[rstest]
#[tokio::test]
async fn test_destroy_removes_article_comments_and_image() {
	// Arrange
	let mut client = TestClient::signed_in().await;
	let category = client.create_category("Rust").await.to_string();
	let upload = client
		.post_multipart(
			"/articles",
			&[
				("article[title]", "With picture"),
				("article[body]", BODY),
				("article[category_id]", &category),
			],
			("article[image]", "cat.png", "image/png", &b"\x89PNG fake"[..]),
		)
		.await;
	let id = common::id_from_location(&upload);
	let pool = client.state().pool.clone();
	Comment::create(&pool, id, &CommentForm::new("Bob", "Nice"), true)
		.await
		.unwrap();
	let key = Image::for_article(&pool, id).await.unwrap().unwrap().storage_key;
	client.credentials("dhh", "secret");

	// Act
	let response = client.delete(&format!("/articles/{}", id)).await;

	// Assert
	assert_eq!(response.status, StatusCode::SEE_OTHER);
	assert_eq!(response.location(), Some("/"));
	assert!(Article::find(&pool, id).await.is_err());
	assert!(Comment::for_article(&pool, id).await.unwrap().is_empty());
	assert!(Image::for_article(&pool, id).await.unwrap().is_none());
	assert!(!client.state().storage.exists(&key).await.unwrap());
	let front = client.get("/").await.text();
	assert!(front.contains("Article was successfully destroyed."));
}

#[rstest]
#[tokio::test]
async fn test_anonymous_destroy_redirects_even_with_credentials() {
	// Arrange
	let mut owner = TestClient::signed_in().await;
	let category = owner.create_category("Rust").await;
	let id = owner.create_article("Keep me", BODY, category, "public").await;
	owner.clear_cookies().await;
	owner.credentials("dhh", "secret");

	// Act
	let response = owner.delete(&format!("/articles/{}", id)).await;

	// Assert
	assert_eq!(response.status, StatusCode::SEE_OTHER);
	assert_eq!(response.location(), Some("/users/sign_in"));
	assert!(Article::find(&owner.state().pool, id).await.is_ok());
}

#[rstest]
#[tokio::test]
async fn test_uploaded_image_is_served() {
	// Arrange
	let client = TestClient::signed_in().await;
	let category = client.create_category("Rust").await.to_string();
	let upload = client
		.post_multipart(
			"/articles",
			&[
				("article[title]", "With picture"),
				("article[body]", BODY),
				("article[category_id]", &category),
			],
			("article[image]", "crab.png", "image/png", &b"\x89PNG crab"[..]),
		)
		.await;
	let id = common::id_from_location(&upload);

	// Act
	let response = client.get(&format!("/articles/{}/image", id)).await;

	// Assert
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.content_type(), Some("image/png"));
	assert_eq!(&response.body[..], b"\x89PNG crab");
}

#[rstest]
#[tokio::test]
async fn test_image_missing_is_not_found() {
	// Arrange
	let client = TestClient::signed_in().await;
	let category = client.create_category("Rust").await;
	let id = client.create_article("No picture", BODY, category, "public").await;

	// Act
	let response = client.get(&format!("/articles/{}/image", id)).await;

	// Assert
	assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn test_blank_search_redirects_home(#[case] term: &str) {
	// Arrange
	let client = TestClient::new().await;
	let uri = format!("/search?{}", common::urlencode(&[("search", term)]));

	// Act
	let response = client.get(&uri).await;

	// Assert
	assert_eq!(response.status, StatusCode::SEE_OTHER);
	assert_eq!(response.location(), Some("/"));
}

#[rstest]
#[tokio::test]
async fn test_search_matches_titles_case_insensitively() {
	// Arrange
	let client = TestClient::signed_in().await;
	let category = client.create_category("Ruby").await;
	client.create_article("Ruby on Rails", BODY, category, "public").await;
	client.create_article("Sinatra", BODY, category, "public").await;
	client.create_article("100% Rust", BODY, category, "public").await;
	client.create_article("Über Rust", BODY, category, "public").await;

	// Act
	let rails = client.get("/search?search=RAILS").await.text();
	let percent = client.get("/search?search=%25").await.text();
	let umlaut = client
		.get(&format!("/search?{}", common::urlencode(&[("search", "über")])))
		.await
		.text();

	// Assert
	assert!(rails.contains("Ruby on Rails"));
	assert!(!rails.contains("Sinatra"));
	assert!(percent.contains("100% Rust"));
	assert!(!percent.contains("Sinatra"));
	assert!(umlaut.contains("Über Rust"));
	assert!(!umlaut.contains("100% Rust"));
}

#[rstest]
#[tokio::test]
async fn test_unknown_route_is_not_found() {
	// Arrange
	let client = TestClient::new().await;

	// Act
	let response = client.get("/nowhere").await;

	// Assert
	assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn test_wrong_method_is_not_allowed() {
	// Arrange
	let client = TestClient::new().await;

	// Act
	let response = client.post_form("/search", &[("search", "rails")]).await;

	// Assert
	assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[rstest]
#[tokio::test]
async fn test_non_numeric_id_is_rejected() {
	// Arrange
	let client = TestClient::new().await;

	// Act
	let response = client.get("/articles/abc").await;

	// Assert
	assert!(response.status.is_client_error());
}
