/// What the guard asks the front-end's router to do.
pub trait Navigator {
    /// Go somewhere else instead of the requested page
    fn redirect(&mut self, path: &str);

    /// Render the requested page
    fn allow(&mut self, path: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    Allowed(String),
    Redirected(String),
}

/// Headless navigator: records what happened and where it ended up.
#[derive(Debug, Clone, Default)]
pub struct NavigationLog {
    pub location: Option<String>,
    pub events: Vec<NavigationEvent>,
}

impl NavigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

impl Navigator for NavigationLog {
    fn redirect(&mut self, path: &str) {
        self.location = Some(path.to_string());
        self.events.push(NavigationEvent::Redirected(path.to_string()));
    }

    fn allow(&mut self, path: &str) {
        self.location = Some(path.to_string());
        self.events.push(NavigationEvent::Allowed(path.to_string()));
    }
}
