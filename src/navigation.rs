//! Stack navigation between the screens.
//!
//! [`Route`] names a screen together with its parameters, and
//! [`Route::can_navigate_to`] is the whole transition table. The
//! [`Navigator`] owns the stack: navigating always pushes a fresh screen,
//! going back pops one unless it is the root.

use std::fmt::{self, Display};

use color_eyre::Result;
use color_eyre::eyre::bail;
use tracing::{debug, info};

use crate::api::ImageUrl;
use crate::screen::{
    BreedListScreen, BreedSearchScreen, ImageDisplayScreen, Screen, ScreenContext, ScreenMsg,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    List,
    Search,
    Display { dog_image: ImageUrl },
}

impl Route {
    /// Allowed moves: list to search, list to display, search to list.
    pub const fn can_navigate_to(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (Self::List, Self::Search | Self::Display { .. }) | (Self::Search, Self::List)
        )
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("List"),
            Self::Search => f.write_str("Search"),
            Self::Display { dog_image } => write!(f, "Display({dog_image})"),
        }
    }
}

pub struct Navigator {
    /// Never empty; the first entry is the root.
    stack: Vec<Box<dyn Screen>>,
    context: ScreenContext,
}

impl Navigator {
    pub fn new(root: Route, context: ScreenContext) -> Self {
        let mut navigator = Self {
            stack: Vec::new(),
            context,
        };
        navigator.push(root);
        navigator
    }

    pub fn current(&mut self) -> &mut dyn Screen {
        let last = self.stack.len() - 1;
        self.stack[last].as_mut()
    }

    pub fn current_route(&self) -> Route {
        self.stack[self.stack.len() - 1].route()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.stack.iter().map(|s| s.route()).collect()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Push a new screen for `route` on top of the current one.
    ///
    /// # Errors
    /// Fails without touching the stack when the transition is not allowed.
    pub fn navigate(&mut self, route: Route) -> Result<()> {
        let from = self.current_route();
        if !from.can_navigate_to(&route) {
            bail!("Cannot navigate from {from} to {route}");
        }
        info!(%from, to = %route, "navigating");
        self.push(route);
        Ok(())
    }

    /// Pop the current screen. Returns `false` at the root.
    pub fn back(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.context.keyboard.hide();
        if let Some(mut screen) = self.stack.pop() {
            info!(route = %screen.route(), "leaving screen");
            screen.destroy();
        }
        true
    }

    pub fn handle_tick(&mut self) {
        for screen in &mut self.stack {
            screen.handle_tick();
        }
    }

    /// Update every screen in the stack.
    ///
    /// Covered screens still apply their own results, but only the top
    /// screen may navigate, and only once per batch: after its first
    /// navigation it is covered too.
    ///
    /// # Errors
    /// Returns the first error a screen reports.
    pub fn update_all(&mut self) -> Result<Vec<ScreenMsg>> {
        let top = self.stack.len() - 1;
        let mut navigated = false;
        let mut out = Vec::new();
        for (index, screen) in self.stack.iter_mut().enumerate() {
            for msg in screen.update()? {
                match msg {
                    ScreenMsg::Navigate(route) if index != top || navigated => {
                        debug!(%route, from = %screen.route(), "covered screen cannot navigate");
                    }
                    ScreenMsg::Navigate(route) => {
                        navigated = true;
                        out.push(ScreenMsg::Navigate(route));
                    }
                    msg => out.push(msg),
                }
            }
        }
        Ok(out)
    }

    /// Breadcrumbs of the whole stack, root first.
    pub fn breadcrumbs(&self) -> Vec<String> {
        self.stack.iter().flat_map(|s| s.breadcrumbs()).collect()
    }

    fn push(&mut self, route: Route) {
        self.context.keyboard.hide();
        let mut screen = self.create_screen(route);
        screen.init();
        self.stack.push(screen);
    }

    fn create_screen(&self, route: Route) -> Box<dyn Screen> {
        match route {
            Route::List => Box::new(BreedListScreen::new(&self.context)),
            Route::Search => Box::new(BreedSearchScreen::new(&self.context)),
            Route::Display { dog_image } => {
                Box::new(ImageDisplayScreen::new(dog_image, &self.context))
            }
        }
    }
}
