//! Wiring of declared groups onto a [`Routable`].

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use super::core::{HandlerRequest, RouteHandler};
use crate::error::ConfigError;
use crate::group::{Arg, Args, Declaration, Group, MemberFn};
use crate::metadata::{ParameterList, ParameterRole};
use crate::openapi::DocumentService;
use crate::router::{Routable, Router};

/// Join a group prefix and a route path into one absolute route path
///
/// Separators are collapsed, `.` and `..` segments are resolved and the
/// result has no trailing slash unless it is the root:
///
/// | prefix | path | result |
/// |---|---|---|
/// | `""` | `"/"` | `/` |
/// | `"/api"` | `"/user"` | `/api/user` |
/// | `"/user"` | `"/"` | `/user` |
/// | `"/user/"` | `"/:id"` | `/user/:id` |
#[must_use]
pub fn join_paths(prefix: &str, path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in prefix.split('/').chain(path.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        "/".to_string()
    } else {
        let mut joined = String::with_capacity(prefix.len() + path.len() + 1);
        for segment in segments {
            joined.push('/');
            joined.push_str(segment);
        }
        joined
    }
}

/// Build the positional arguments for one invocation
///
/// Produces exactly `arity` arguments. Filled slots are resolved from the
/// request by role; positions without a descriptor stay [`Arg::Unbound`].
#[must_use]
pub fn extract_args(params: &ParameterList, arity: usize, req: &HandlerRequest) -> Args {
    let mut args = Vec::with_capacity(arity);
    for index in 0..arity {
        let arg = match params.get(index) {
            None => Arg::Unbound,
            Some(param) => match param.role {
                ParameterRole::InjectRequest => Arg::Request(req.clone()),
                ParameterRole::InjectResponse => Arg::Response(req.responder()),
                ParameterRole::BodyField => Arg::Value(req.body_field(&param.key).cloned()),
                ParameterRole::QueryField => Arg::Value(
                    req.get_query_param(&param.key)
                        .map(|v| Value::String(v.to_string())),
                ),
                ParameterRole::UrlSegment => Arg::Value(
                    req.get_path_param(&param.key)
                        .map(|v| Value::String(v.to_string())),
                ),
            },
        };
        args.push(arg);
    }
    Args::new(args)
}

/// Create the route handler invoking `func` on `instance`
pub fn bind_handler<G: Group>(
    name: &str,
    instance: Arc<G>,
    func: MemberFn<G>,
    params: ParameterList,
    arity: usize,
) -> RouteHandler {
    RouteHandler::new(name, move |req: HandlerRequest| {
        let args = extract_args(&params, arity, &req);
        debug!(
            request_id = %req.request_id,
            handler_name = %req.handler_name,
            arg_count = args.len(),
            "Arguments extracted"
        );
        func(&instance, args);
    })
}

/// Wire every routed member of a declared group onto `routable`
///
/// Members without a verb are skipped. For each wired member the document
/// service is notified once. Returns the number of routes added.
pub fn build_router<G, R>(
    decl: &Declaration<G>,
    instance: Arc<G>,
    docs: &DocumentService,
    routable: &mut R,
) -> usize
where
    G: Group,
    R: Routable + ?Sized,
{
    let target = decl.target();
    let store = decl.store();
    let group_path = store.group_path(target).unwrap_or("");
    let mut wired = 0;

    for member in decl.members() {
        let Some(verb) = store.verb(target, member) else {
            debug!(group = %target.name(), member = %member, "Member has no verb - skipped");
            continue;
        };
        let Some(func) = decl.member_fn(member) else {
            continue;
        };

        let full_path = join_paths(group_path, store.route_path(target, member).unwrap_or(""));
        let middleware = store.middleware(target, member).to_vec();
        let params = store.parameters(target, member).cloned().unwrap_or_default();
        let arity = store
            .param_types(target, member)
            .map_or(params.len(), <[String]>::len);
        let name = format!("{}::{}", target.name(), member);

        info!(
            group = %target.name(),
            member = %member,
            verb = %verb,
            path = %full_path,
            middleware_count = middleware.len(),
            arity = arity,
            "Route wired"
        );

        let handler = bind_handler(&name, Arc::clone(&instance), func, params, arity);
        routable.add_route(verb, &full_path, middleware, handler);
        docs.record_route(store, target, member);
        wired += 1;
    }

    wired
}

/// Declare `group` and wire it into a fresh [`Router`]
///
/// # Errors
///
/// Returns the [`ConfigError`] raised by `G::declare`; nothing is wired or
/// documented in that case.
pub fn register_group<G: Group>(group: G, docs: &DocumentService) -> Result<Router, ConfigError> {
    let decl = Declaration::<G>::of()?;
    let mut router = Router::new();
    let wired = build_router(&decl, Arc::new(group), docs, &mut router);
    info!(
        group = %decl.target().name(),
        routes_count = wired,
        "Group registered"
    );
    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::RequestId;
    use crate::metadata::ParameterDescriptor;
    use crate::router::ParamVec;
    use may::sync::mpsc;
    use serde_json::json;

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("", "/"), "/");
        assert_eq!(join_paths("", ""), "/");
        assert_eq!(join_paths("/api", "/user"), "/api/user");
        assert_eq!(join_paths("/user", "/"), "/user");
        assert_eq!(join_paths("/user/", "/:id"), "/user/:id");
        assert_eq!(join_paths("api//v1", "items/"), "/api/v1/items");
        assert_eq!(join_paths("/a/b", "../c"), "/a/c");
    }

    #[test]
    fn test_join_paths_is_idempotent() {
        let once = join_paths("/api/", "//user/");
        assert_eq!(join_paths(&once, ""), once);
        assert!(!once.contains("//"));
    }

    fn descriptor(key: &str, role: ParameterRole) -> ParameterDescriptor {
        ParameterDescriptor {
            key: key.to_string(),
            role,
            declared_type: None,
            summary: None,
            example: None,
            required: None,
            deprecated: None,
        }
    }

    fn request() -> (HandlerRequest, mpsc::Receiver<crate::dispatcher::HandlerResponse>) {
        let (reply_tx, reply_rx) = mpsc::channel();
        let mut query_params = ParamVec::new();
        query_params.push((Arc::from("name"), "ada".to_string()));
        let mut path_params = ParamVec::new();
        path_params.push((Arc::from("id"), "42".to_string()));
        let req = HandlerRequest {
            request_id: RequestId::new(),
            method: http::Method::POST,
            path: "/user/42".to_string(),
            handler_name: "POST /user/:id".to_string(),
            path_params,
            query_params,
            headers: Default::default(),
            cookies: Default::default(),
            body: Some(json!({"email": "ada@example.com", "age": 36})),
            reply_tx,
        };
        (req, reply_rx)
    }

    #[test]
    fn test_extract_args_by_role() {
        let mut params = ParameterList::new();
        params.set(0, descriptor("email", ParameterRole::BodyField));
        params.set(1, descriptor("name", ParameterRole::QueryField));
        params.set(2, descriptor("id", ParameterRole::UrlSegment));
        params.set(3, descriptor("missing", ParameterRole::BodyField));
        params.set(4, descriptor("request", ParameterRole::InjectRequest));
        params.set(5, descriptor("response", ParameterRole::InjectResponse));
        let (req, rx) = request();

        let args = extract_args(&params, 6, &req);
        assert_eq!(args.len(), 6);
        assert_eq!(args.str(0), Some("ada@example.com"));
        assert_eq!(args.str(1), Some("ada"));
        assert_eq!(args.str(2), Some("42"));
        assert!(matches!(args.get(3), Some(Arg::Value(None))));
        assert_eq!(args.request(4).map(|r| r.path.as_str()), Some("/user/42"));

        args.responder(5).unwrap().send(json!({"ok": true}));
        let resp = rx.recv().unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, json!({"ok": true}));
    }

    #[test]
    fn test_extract_args_leaves_gaps_unbound() {
        let mut params = ParameterList::new();
        params.set(2, descriptor("age", ParameterRole::BodyField));
        let (req, _rx) = request();

        let args = extract_args(&params, 4, &req);
        assert_eq!(args.len(), 4);
        assert!(matches!(args.get(0), Some(Arg::Unbound)));
        assert!(matches!(args.get(1), Some(Arg::Unbound)));
        assert_eq!(args.value(2), Some(&json!(36)));
        assert!(matches!(args.get(3), Some(Arg::Unbound)));
    }

    #[test]
    fn test_extract_args_stops_at_arity() {
        let mut params = ParameterList::new();
        params.set(0, descriptor("email", ParameterRole::BodyField));
        params.set(1, descriptor("name", ParameterRole::QueryField));
        params.set(2, descriptor("id", ParameterRole::UrlSegment));
        let (req, _rx) = request();

        let args = extract_args(&params, 1, &req);
        assert_eq!(args.len(), 1);
        assert_eq!(args.str(0), Some("ada@example.com"));
        assert!(args.get(1).is_none());
    }
}
