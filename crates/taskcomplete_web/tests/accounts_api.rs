mod common;

use axum::http::StatusCode;
use common::{body_json, location, set_cookie, TestApp};
use taskcomplete_core::{SqliteUserRepository, UserRepository, SIGNUP_GROUP};

const SIGNUP: &[(&str, &str)] = &[
    ("username", "john"),
    ("email", "john@example.com"),
    ("password1", "tulip-season-42"),
    ("password2", "tulip-season-42"),
];

#[tokio::test]
async fn signup_login_logout_roundtrip() {
    let app = TestApp::new();

    let response = app.post("/signup/", SIGNUP, None).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/account/login/");

    let groups = app
        .state
        .with_conn(|conn| {
            let repo = SqliteUserRepository::new(conn);
            let user = repo.find_by_username("john").unwrap().unwrap();
            Ok(repo.list_user_groups(user.id).unwrap())
        })
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, SIGNUP_GROUP);

    let response = app
        .post(
            "/account/login/?next=%2Ftasks%2F",
            &[("username", "john"), ("password", "tulip-season-42")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/tasks/");
    let cookie = set_cookie(&response).expect("session cookie");
    assert!(cookie.starts_with("sessionid="));

    let response = app.get("/projects/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.post("/account/logout/", &[], Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");

    let response = app.get("/projects/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).starts_with("/account/login/"));
}

#[tokio::test]
async fn invalid_signup_is_rendered_again_without_passwords() {
    let app = TestApp::new();

    let response = app
        .post(
            "/signup/",
            &[
                ("username", "john doe"),
                ("email", "not-an-email"),
                ("password1", "12345678"),
                ("password2", "87654321"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    let errors = &page["form"]["errors"];
    assert!(errors["username"].is_array());
    assert!(errors["email"].is_array());
    assert!(errors["password2"].is_array());
    assert_eq!(page["form"]["fields"]["username"], "john doe");
    assert!(page["form"]["fields"]["password1"].is_null());
    assert!(page["form"]["fields"]["password2"].is_null());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let app = TestApp::new();
    app.user("john");

    let response = app.post("/signup/", SIGNUP, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(
        page["form"]["errors"]["username"][0],
        "A user with that username already exists."
    );
}

#[tokio::test]
async fn wrong_password_shows_non_field_error() {
    let app = TestApp::new();
    app.post("/signup/", SIGNUP, None).await;

    let response = app
        .post(
            "/account/login/",
            &[("username", "john"), ("password", "wrong-password")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).is_none());
    let page = body_json(response).await;
    assert!(page["form"]["errors"]["__all__"].is_array());
    assert!(page["form"]["fields"]["password"].is_null());
}

#[tokio::test]
async fn external_next_falls_back_to_project_list() {
    let app = TestApp::new();
    app.post("/signup/", SIGNUP, None).await;

    let response = app
        .post(
            "/account/login/",
            &[
                ("username", "john"),
                ("password", "tulip-season-42"),
                ("next", "https://evil.example/"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/projects/");

    for next in ["/\t/evil.example/", "/\n/evil.example/", "/\\evil.example/"] {
        let response = app
            .post(
                "/account/login/",
                &[
                    ("username", "john"),
                    ("password", "tulip-season-42"),
                    ("next", next),
                ],
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/projects/", "next={next:?}");
    }
}

#[tokio::test]
async fn login_page_carries_next() {
    let app = TestApp::new();
    let response = app.get("/account/login/?next=%2Fprojects%2F", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page["next"], "/projects/");
}
