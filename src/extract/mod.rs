//! Per-entity extraction.
//!
//! Visits an entity's profile page, reads the skill count from a fixed
//! phrase, then follows the "see all interests" link and counts the
//! interest list after stabilizing it. Every fault is folded into the
//! returned [`Status`]; nothing escapes as an error.

pub mod pacing;
pub mod pattern;
pub mod stabilize;

use crate::config::ExtractConfig;
use crate::events::{Event, EventSink};
use crate::page::{PageAccessor, PageError};
use crate::snapshot::{ExtractionResult, Status};
use pacing::{Pacer, Pause, ThreadSleep};
use pattern::CountStrategy;

pub struct Extractor<P, S = ThreadSleep> {
    page: P,
    pause: S,
    pacer: Pacer,
    settings: ExtractConfig,
    skills: Box<dyn CountStrategy>,
}

impl<P: PageAccessor> Extractor<P> {
    pub fn new(page: P, settings: ExtractConfig, skills: Box<dyn CountStrategy>) -> Self {
        Extractor::with_pause(page, ThreadSleep, settings, skills)
    }
}

impl<P: PageAccessor, S: Pause> Extractor<P, S> {
    pub fn with_pause(
        page: P,
        pause: S,
        settings: ExtractConfig,
        skills: Box<dyn CountStrategy>,
    ) -> Self {
        let pacer = Pacer::new(settings.pacing_min, settings.pacing_max);
        Extractor { page, pause, pacer, settings, skills }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn pause(&self) -> &S {
        &self.pause
    }

    /// Random pause between two entity visits.
    pub fn pace(&mut self) {
        self.pacer.wait(&mut self.pause);
    }

    pub fn extract(&mut self, entity_id: &str, events: &mut dyn EventSink) -> ExtractionResult {
        events.emit(Event::ExtractionStarted { entity_id });

        let result = match self.try_extract(entity_id, events) {
            Ok((interests_count, skills_count)) => ExtractionResult {
                interests_count,
                skills_count,
                status: Status::Success,
            },
            Err(PageError::Timeout(_)) => ExtractionResult::failed(Status::Timeout),
            Err(PageError::ElementNotFound(_)) => ExtractionResult::failed(Status::ElementNotFound),
            Err(PageError::Other(reason)) => ExtractionResult::failed(Status::other(reason)),
        };

        events.emit(Event::ExtractionFinished { entity_id, result: &result });
        result
    }

    fn try_extract(
        &mut self,
        entity_id: &str,
        events: &mut dyn EventSink,
    ) -> Result<(u32, u32), PageError> {
        self.pacer.wait(&mut self.pause);
        self.page.navigate(entity_id)?;
        self.page.trigger_lazy_load()?;
        self.pacer.wait(&mut self.pause);

        let document = self.page.current_document()?;
        let skills = self.skills.count(&document).unwrap_or(0);
        events.emit(Event::SkillsCounted { entity_id, skills });

        let interests = match self.count_interests(events) {
            Ok(count) => count,
            Err(err @ (PageError::Timeout(_) | PageError::ElementNotFound(_))) => {
                events.emit(Event::InterestsUnavailable { entity_id, reason: err.to_string() });
                0
            }
            Err(err) => return Err(err),
        };

        Ok((interests, skills))
    }

    fn count_interests(&mut self, events: &mut dyn EventSink) -> Result<u32, PageError> {
        let selector = &self.settings.interests_link;
        let link = self.page.wait_for_visible(selector, self.settings.wait_timeout)?;
        let href = self
            .page
            .attribute(&link, "href")?
            .ok_or_else(|| PageError::ElementNotFound(format!("{selector} has no href")))?;
        self.page.navigate(&href)?;

        let stabilized = stabilize::stabilize(
            &mut self.page,
            &mut self.pause,
            &self.settings.interest_item,
            self.settings.stabilize_attempts,
            self.settings.stabilize_pause,
            events,
        )?;
        self.pacer.wait(&mut self.pause);

        Ok(u32::try_from(stabilized.count).unwrap_or(u32::MAX))
    }
}
