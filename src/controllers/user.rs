use serde::Serialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::info;

use crate::annotations::{
    body_field, group, http_delete, http_get, http_post, http_response, middleware, query,
    request_body, requirement, response, url_param,
};
use crate::dispatcher::HandlerResponse;
use crate::error::ConfigError;
use crate::group::{Args, Declaration, Group};
use crate::middleware::from_fn;

/// Header checked by the `require_api_key` route middleware
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub email: String,
    #[serde(skip)]
    password: String,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
}

impl User {
    #[must_use]
    pub fn check_password(&self, candidate: &str) -> bool {
        self.password == candidate
    }
}

/// In-memory user directory mounted at `/user`
#[derive(Debug, Default)]
pub struct UserController {
    users: RwLock<Vec<User>>,
    next_id: AtomicU64,
}

impl UserController {
    /// Number of stored users
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn create_user(&self, args: Args) {
        let Some(res) = args.responder(4) else {
            return;
        };
        let fields = (args.str(0), args.str(1), args.str(2), args.str(3));
        let (Some(email), Some(password), Some(first_name), Some(last_name)) = fields else {
            res.send_status(400, json!({ "error": "Invalid Request Data" }));
            return;
        };
        if !email.contains('@') || password.len() < 8 {
            res.send_status(403, json!({ "error": "Validation Failed" }));
            return;
        }

        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            res.send_status(409, json!({ "error": "Email Already Exists" }));
            return;
        }
        let user = User {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            email: email.to_string(),
            password: password.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            active: true,
        };
        info!(user_id = user.id, "User created");
        let body = serde_json::to_value(&user).unwrap_or_default();
        users.push(user);
        res.send_status(201, body);
    }

    fn list_users(&self, args: Args) {
        let Some(res) = args.responder(2) else {
            return;
        };
        let active = args.bool(0);
        let name = args.str(1).map(str::to_lowercase);
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        let matching: Vec<&User> = users
            .iter()
            .filter(|u| active.is_none_or(|a| u.active == a))
            .filter(|u| {
                name.as_deref().is_none_or(|n| {
                    u.first_name.to_lowercase().contains(n) || u.last_name.to_lowercase().contains(n)
                })
            })
            .collect();
        res.send(json!(matching));
    }

    fn find(&self, id: Option<&str>) -> Option<User> {
        let id: u64 = id?.parse().ok()?;
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    fn get_user(&self, args: Args) {
        let Some(res) = args.responder(1) else {
            return;
        };
        match self.find(args.str(0)) {
            Some(user) => res.send(json!(user)),
            None => res.send_status(404, json!({ "error": "User Not Found" })),
        }
    }

    fn delete_user(&self, args: Args) {
        let Some(res) = args.responder(1) else {
            return;
        };
        let Some(user) = self.find(args.str(0)) else {
            res.send_status(404, json!({ "error": "User Not Found" }));
            return;
        };
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        users.retain(|u| u.id != user.id);
        info!(user_id = user.id, "User deleted");
        res.send(json!({ "deleted": user.id }));
    }
}

impl Group for UserController {
    fn declare(decl: &mut Declaration<Self>) -> Result<(), ConfigError> {
        decl.group(
            group("/user")
                .tag("user")
                .description("Create and manage users in the system"),
        );

        decl.method(
            "create_user",
            &["string", "string", "string", "string", "Response"],
            Self::create_user,
        )
        .with(
            request_body("application/json")
                .description("User information about the user to be added to the system")
                .required(true),
        )
        .with(http_response(201, "User Created"))
        .with(http_response(400, "Invalid Request Data"))
        .with(http_response(403, "Validation Failed"))
        .with(http_response(409, "Email Already Exists"))
        .with(http_post("/").describe("Create a new user"))
        .param(
            0,
            body_field("email")
                .summary("User's email address")
                .example("user@example.com")
                .required(true),
        )?
        .param(
            1,
            body_field("password")
                .summary("Valid password")
                .example("L1m1t3dAcc355")
                .required(true),
        )?
        .param(
            2,
            body_field("firstName")
                .summary("User's first name")
                .example("Paul")
                .required(true),
        )?
        .param(
            3,
            body_field("lastName")
                .summary("User's last name")
                .example("Forbes")
                .required(true),
        )?
        .param(4, response())?;

        decl.method(
            "list_users",
            &["boolean", "string", "Response"],
            Self::list_users,
        )
        .with(
            http_response(200, "Success").content(
                "application/json",
                json!([{ "id": 1, "email": "user@example.com", "firstName": "Paul", "lastName": "Forbes", "active": true }]),
            ),
        )
        .with(http_response(500, "Internal Error"))
        .with(http_get("/").describe("List users in the system"))
        .param(
            0,
            query("active")
                .summary("Filter users by active status")
                .example("true")
                .required(false),
        )?
        .param(
            1,
            query("name")
                .summary("Search users by first or last name")
                .example("Forbes")
                .required(false),
        )?
        .param(2, response())?;

        decl.method("get_user", &["string", "Response"], Self::get_user)
            .with(http_get("/:userId").describe("Get a single user"))
            .with(http_response(200, "Success"))
            .with(http_response(404, "User Not Found"))
            .param(0, url_param("userId").summary("Numeric user id").example("1"))?
            .param(1, response())?;

        decl.method("delete_user", &["string", "Response"], Self::delete_user)
            .with(http_delete("/:userId").describe("Remove a user"))
            .with(http_response(200, "User Deleted"))
            .with(http_response(401, "Missing API key"))
            .with(http_response(404, "User Not Found"))
            .with(
                middleware(vec![from_fn("require_api_key", |req| {
                    match req.get_header(API_KEY_HEADER) {
                        Some(key) if !key.is_empty() => None,
                        _ => Some(HandlerResponse::error(401, "Unauthorized")),
                    }
                })])
                .security(vec![requirement([("apiKey", &[][..])])]),
            )
            .param(0, url_param("userId").summary("Numeric user id"))?
            .param(1, response())?;

        Ok(())
    }
}
