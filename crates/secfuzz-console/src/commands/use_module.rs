//! `use <module>`: select the current module.

use crate::command::{Command, CommandEnv};
use crate::error::CommandError;

pub struct CommandUse;

impl Command for CommandUse {
    fn name(&self) -> &'static str {
        "use"
    }

    fn description(&self) -> &'static str {
        "Selects a module by qualified name (unique prefixes accepted)"
    }

    fn usage(&self) -> &'static str {
        "<category/name>"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn run(&self, args: &[String], env: &mut CommandEnv<'_>) -> Result<(), CommandError> {
        let module = env.modules.select(&args[0])?;
        tracing::debug!(module = module.qualified_name(), "Module selected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{args, context, with_env};
    use crate::error::ErrorKind;

    #[test]
    fn test_use_selects_module() {
        let mut ctx = context();
        let (res, _) = with_env(&mut ctx, |env| CommandUse.run(&args(&["foo/bar"]), env));
        res.unwrap();
        assert_eq!(ctx.current().unwrap().qualified_name(), "foo/bar");
    }

    #[test]
    fn test_use_unknown_module_is_validation_failure() {
        let mut ctx = context();
        ctx.select("mqtt/echo").unwrap();
        let (res, _) = with_env(&mut ctx, |env| CommandUse.run(&args(&["nope/x"]), env));
        assert_eq!(res.unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(ctx.current().unwrap().qualified_name(), "mqtt/echo");
    }
}
