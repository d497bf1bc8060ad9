//! Client-side search session.
//!
//! [`SearchSession`] owns everything a search client displays: the current
//! plot, the current results, which result is selected and which one is
//! hovered. Views read from it, and user or network events go through its
//! transition methods. It does no I/O; the caller runs the request for a
//! [`SearchTicket`] and hands the outcome back to [`SearchSession::complete`].
//!
//! Overlapping searches are ordered by generation: every submission gets a
//! new generation number and only the completion of the latest one is
//! applied, whatever order the responses arrive in.

use std::borrow::Cow;
use std::fmt;

use crate::model::{DocumentResult, PlotPayload, SearchResponse};

/// Query issued on start-up so the first screen is not empty.
pub const EXAMPLE_QUERY: &str = "evidence of criminal activity";

/// A submitted search waiting for its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub query: String,
}

/// What [`SearchSession::complete`] did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The response replaced the displayed results.
    Applied { results: usize },
    /// A newer search was submitted after this one; nothing changed.
    Stale,
    /// The request or the response was bad; nothing displayed changed.
    Failed(String),
}

/// What the main panel shows. Plot and detail view are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MainPanel<'a> {
    Plot,
    Detail(&'a DocumentResult),
}

#[derive(Debug, Default)]
pub struct SearchSession {
    plot: Option<PlotPayload>,
    results: Vec<DocumentResult>,
    selected: Option<usize>,
    hovered: Option<usize>,
    generation: u64,
    pending: Option<SearchTicket>,
    last_query: Option<String>,
    last_error: Option<String>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new search and return the ticket to run it with.
    ///
    /// Any search still in flight becomes stale.
    pub fn begin_search(&mut self, query: impl Into<String>) -> SearchTicket {
        self.generation += 1;
        let ticket = SearchTicket {
            generation: self.generation,
            query: query.into(),
        };
        log::debug!("search #{} submitted: {:?}", ticket.generation, ticket.query);
        self.last_query = Some(ticket.query.clone());
        self.pending = Some(ticket.clone());
        ticket
    }

    /// Submit the last query again, if there was one.
    pub fn retry(&mut self) -> Option<SearchTicket> {
        let query = self.last_query.clone()?;
        Some(self.begin_search(query))
    }

    /// Apply the outcome of the search with the given generation.
    ///
    /// A successful response fully replaces plot and results and clears
    /// selection and hover, which referred to the old result set. Failures
    /// and responses that break the plot/result correspondence leave the
    /// displayed state as it was.
    pub fn complete<E: fmt::Display>(
        &mut self,
        generation: u64,
        outcome: Result<SearchResponse, E>,
    ) -> Completion {
        if generation != self.generation {
            log::debug!(
                "discarding search #{} (latest is #{})",
                generation,
                self.generation
            );
            return Completion::Stale;
        }
        self.pending = None;

        let response = match outcome {
            Ok(response) => response,
            Err(e) => return self.fail(format!("Search failed: {}", e)),
        };
        if let Err(e) = response.validate() {
            return self.fail(format!("Malformed response: {}", e));
        }

        let count = response.results.len();
        log::info!("search #{} returned {} results", generation, count);
        self.plot = Some(response.plot_data);
        self.results = response.results;
        self.selected = None;
        self.hovered = None;
        self.last_error = None;
        Completion::Applied { results: count }
    }

    fn fail(&mut self, message: String) -> Completion {
        log::warn!("{}", message);
        self.last_error = Some(message.clone());
        Completion::Failed(message)
    }

    /// Set or clear the hovered result. Indices outside the current results
    /// are ignored; returns whether the hover changed.
    pub fn hover(&mut self, index: Option<usize>) -> bool {
        if let Some(i) = index {
            if i >= self.results.len() {
                log::debug!("ignoring hover on row {} of {}", i, self.results.len());
                return false;
            }
        }
        let changed = self.hovered != index;
        self.hovered = index;
        changed
    }

    /// Map a click on plot point `index` to the result row to scroll to.
    pub fn point_clicked(&self, index: usize) -> Option<usize> {
        if index < self.results.len() {
            Some(index)
        } else {
            log::debug!("ignoring click on point {} of {}", index, self.results.len());
            None
        }
    }

    /// Toggle selection of the result at `index`.
    ///
    /// Selecting the selected result goes back to the plot; selecting any
    /// other result shows it directly. Out-of-range indices are ignored.
    pub fn toggle_selection(&mut self, index: usize) {
        if index >= self.results.len() {
            log::debug!("ignoring selection of row {} of {}", index, self.results.len());
            return;
        }
        self.selected = if self.selected == Some(index) {
            None
        } else {
            Some(index)
        };
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn main_panel(&self) -> MainPanel<'_> {
        match self.selected() {
            Some(doc) => MainPanel::Detail(doc),
            None => MainPanel::Plot,
        }
    }

    /// The figure to draw: the current plot with the hovered marker
    /// enlarged, or the empty default before the first result set.
    pub fn display_plot(&self) -> Cow<'_, PlotPayload> {
        match &self.plot {
            Some(plot) => plot.with_emphasis(self.hovered),
            None => Cow::Owned(PlotPayload::default()),
        }
    }

    pub fn plot(&self) -> Option<&PlotPayload> {
        self.plot.as_ref()
    }

    pub fn results(&self) -> &[DocumentResult] {
        &self.results
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&DocumentResult> {
        self.selected.and_then(|i| self.results.get(i))
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn is_searching(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_query(&self) -> Option<&str> {
        self.pending.as_ref().map(|ticket| ticket.query.as_str())
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
