use crate::annotations::{group, http_get, http_response, response};
use crate::error::ConfigError;
use crate::group::{Args, Declaration, Group};

/// Root group answering with a fixed greeting
#[derive(Debug, Clone)]
pub struct HelloWorldController {
    text: String,
}

impl Default for HelloWorldController {
    fn default() -> Self {
        Self {
            text: "Hello, World!".to_string(),
        }
    }
}

impl HelloWorldController {
    fn hello_world(&self, args: Args) {
        if let Some(res) = args.responder(0) {
            res.send(self.text.clone());
        }
    }

    fn hello_world2(&self, args: Args) {
        if let Some(res) = args.responder(0) {
            res.send(format!("{} 2x", self.text));
        }
    }
}

impl Group for HelloWorldController {
    fn declare(decl: &mut Declaration<Self>) -> Result<(), ConfigError> {
        decl.group(group("/"));
        decl.method("hello_world", &["Response"], Self::hello_world)
            .with(http_get("/").describe("Get a Hello World"))
            .with(http_response(200, "Success"))
            .param(0, response())?;
        decl.method("hello_world2", &["Response"], Self::hello_world2)
            .with(http_get("/second").describe("Get another Hello World"))
            .with(http_response(200, "Success"))
            .param(0, response())?;
        Ok(())
    }
}
