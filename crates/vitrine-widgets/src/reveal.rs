//! Scroll-triggered entrance animations.
//!
//! Cards fade in and skill bars fill the first time enough of them becomes
//! visible. Intersection ratios come from the host.

use vitrine_dom::{NodeId, Selector};
use vitrine_types::config::RevealConfig;
use vitrine_types::error::Result;

use crate::event::{EventResponse, PageEvent, TimerTag};
use crate::page::{Host, Widget};

const CARD_SELECTOR: &str = ".card, .timeline-item, .skill-category";
const SKILL_BAR_SELECTOR: &str = ".skill-fill";

pub struct Reveal {
    config: RevealConfig,
    cards: Vec<NodeId>,
    bars: Vec<NodeId>,
}

impl Reveal {
    pub fn new(config: &RevealConfig) -> Self {
        Self {
            config: config.clone(),
            cards: Vec::new(),
            bars: Vec::new(),
        }
    }

    /// Nodes still waiting for their first reveal.
    pub fn observed(&self) -> usize {
        self.cards.len() + self.bars.len()
    }

    fn on_intersect(&mut self, host: &mut Host, target: NodeId, ratio: f32) -> bool {
        if ratio >= self.config.card_threshold
            && let Some(i) = self.cards.iter().position(|&n| n == target)
        {
            self.cards.swap_remove(i);
            host.doc.set_style(target, "animation", &self.config.animation);
            return true;
        }
        if ratio >= self.config.skill_threshold
            && let Some(i) = self.bars.iter().position(|&n| n == target)
        {
            self.bars.swap_remove(i);
            let width = host.doc.style(target, "width").unwrap_or_default();
            host.doc.set_style(target, "width", "0");
            host.timers.schedule(
                self.config.restore_delay_ms,
                TimerTag::SkillBarRestore { bar: target, width },
            );
            return true;
        }
        false
    }
}

impl Widget for Reveal {
    fn name(&self) -> &'static str {
        "reveal"
    }

    fn install(&mut self, host: &mut Host) -> Result<()> {
        if host.viewport.prefers_reduced_motion {
            log::info!("reduced motion preferred, animations off");
            return Ok(());
        }
        self.cards = host.query_all(CARD_SELECTOR)?;
        self.bars = host.query_all(SKILL_BAR_SELECTOR)?;
        // A skill bar that is also a card animates as a card.
        let cards = Selector::parse(CARD_SELECTOR)?;
        self.bars.retain(|&b| !cards.matches(&host.doc, b));
        log::debug!(
            "observing {} cards and {} skill bars",
            self.cards.len(),
            self.bars.len()
        );
        Ok(())
    }

    fn handle_event(&mut self, host: &mut Host, event: &PageEvent) -> EventResponse {
        match event {
            PageEvent::Intersect { target, ratio } => {
                if self.on_intersect(host, *target, *ratio) {
                    EventResponse::HANDLED
                } else {
                    EventResponse::IGNORED
                }
            },
            PageEvent::Timer(TimerTag::SkillBarRestore { bar, width }) => {
                host.doc.set_style(*bar, "width", width);
                EventResponse::HANDLED
            },
            _ => EventResponse::IGNORED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use crate::test_utils::{SKILLS_PAGE, page_with};

    fn reveal_page(reduced: bool) -> Page {
        let mut page = page_with(SKILLS_PAGE).with_reduced_motion(reduced);
        page.install(Box::new(Reveal::new(&RevealConfig::default())))
            .unwrap();
        page
    }

    fn style(page: &Page, selector: &str, prop: &str) -> Option<String> {
        let n = page.host().query(selector).unwrap().unwrap();
        page.doc().style(n, prop)
    }

    #[test]
    fn card_animates_at_threshold() {
        let mut page = reveal_page(false);
        assert_eq!(page.widget::<Reveal>().unwrap().observed(), 4);
        page.intersect("#c1", 0.05).unwrap();
        assert_eq!(style(&page, "#c1", "animation"), None);
        assert!(page.intersect("#c1", 0.1).unwrap().handled);
        assert_eq!(
            style(&page, "#c1", "animation").as_deref(),
            Some("fadeInUp 0.6s ease-out")
        );
    }

    #[test]
    fn card_is_unobserved_after_first_reveal() {
        let mut page = reveal_page(false);
        page.intersect("#c1", 1.0).unwrap();
        let c1 = page.host().query("#c1").unwrap().unwrap();
        page.host_mut().doc.set_style(c1, "animation", "");
        assert!(!page.intersect("#c1", 1.0).unwrap().handled);
        assert_eq!(style(&page, "#c1", "animation"), None);
    }

    #[test]
    fn skill_bar_collapses_then_restores() {
        let mut page = reveal_page(false);
        page.intersect("#rust-bar", 0.4).unwrap();
        assert_eq!(style(&page, "#rust-bar", "width").as_deref(), Some("90%"));
        page.intersect("#rust-bar", 0.5).unwrap();
        assert_eq!(style(&page, "#rust-bar", "width").as_deref(), Some("0"));
        page.advance(99);
        assert_eq!(style(&page, "#rust-bar", "width").as_deref(), Some("0"));
        page.advance(1);
        assert_eq!(style(&page, "#rust-bar", "width").as_deref(), Some("90%"));
    }

    #[test]
    fn reduced_motion_disables_everything() {
        let mut page = reveal_page(true);
        assert_eq!(page.widget::<Reveal>().unwrap().observed(), 0);
        assert!(!page.intersect(".card", 1.0).unwrap().handled);
        page.intersect("#rust-bar", 1.0).unwrap();
        assert_eq!(style(&page, "#rust-bar", "width").as_deref(), Some("90%"));
    }
}
