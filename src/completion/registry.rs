use clap::Command;

/// How many value tokens an option consumes after it appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Flag,
    Value,
}

impl Arity {
    pub fn takes_value(self) -> bool {
        matches!(self, Arity::Value)
    }
}

/// One declared option: the strings that trigger it and its arity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    name: String,
    option_strings: Vec<String>,
    arity: Arity,
}

impl Action {
    pub fn new<I, S>(name: impl Into<String>, option_strings: I, arity: Arity) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            option_strings: option_strings.into_iter().map(Into::into).collect(),
            arity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn option_strings(&self) -> &[String] {
        &self.option_strings
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn matches(&self, option_string: &str) -> bool {
        self.option_strings.iter().any(|s| s == option_string)
    }
}

/// Ordered set of actions known to one application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    actions: Vec<Action>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the options of a clap command.
    ///
    /// The command is built first so that generated arguments (`--help`,
    /// `--version`) are part of the registry. Positional arguments have no
    /// option strings and are skipped.
    pub fn from_command(command: &Command) -> Self {
        let mut command = command.clone();
        command.build();

        let actions = command
            .get_arguments()
            .filter(|arg| !arg.is_positional())
            .map(|arg| {
                let mut option_strings: Vec<String> = arg
                    .get_short_and_visible_aliases()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|c| format!("-{}", c))
                    .collect();
                option_strings.extend(
                    arg.get_long_and_visible_aliases()
                        .unwrap_or_default()
                        .into_iter()
                        .map(|l| format!("--{}", l)),
                );
                let arity = if arg.get_action().takes_values() {
                    Arity::Value
                } else {
                    Arity::Flag
                };
                Action::new(arg.get_id().as_str(), option_strings, arity)
            })
            .filter(|action| !action.option_strings.is_empty())
            .collect();

        Self { actions }
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Drop the actions whose name is listed in `names`.
    pub fn without(mut self, names: &[&str]) -> Self {
        self.actions.retain(|a| !names.contains(&a.name()));
        self
    }

    /// First action that declares `option_string`.
    pub fn find(&self, option_string: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.matches(option_string))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl FromIterator<Action> for Registry {
    fn from_iter<T: IntoIterator<Item = Action>>(iter: T) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}
