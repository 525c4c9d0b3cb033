//! Derived dashboard view: events grouped by date plus the next upcoming one.
//!
//! Everything here works on a fully fetched snapshot. Nothing is patched
//! locally after a write; callers fetch a new snapshot instead.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::LicitacaoResult;
use crate::evento::Evento;
use crate::format::{DATA_INDEFINIDA, format_data};
use crate::service::{DataService, OrderBy};

/// Events sharing the same calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateGroup {
    /// `dd/mm/yyyy`, or "Data indefinida" for events without a date.
    pub label: String,
    pub date: Option<NaiveDate>,
    pub eventos: Vec<Evento>,
}

impl DateGroup {
    fn new(date: Option<NaiveDate>) -> Self {
        let label = match date {
            Some(d) => format_data(d),
            None => DATA_INDEFINIDA.to_string(),
        };
        DateGroup {
            label,
            date,
            eventos: Vec::new(),
        }
    }
}

/// Group events by date.
///
/// Groups come out in order of first appearance and each group keeps the
/// relative input order, so a snapshot sorted by `data, hora` renders
/// chronologically.
pub fn group_by_date(eventos: &[Evento]) -> Vec<DateGroup> {
    let mut groups: Vec<DateGroup> = Vec::new();
    let mut index: HashMap<Option<NaiveDate>, usize> = HashMap::new();

    for evento in eventos {
        let date = evento.data();
        let slot = *index.entry(date).or_insert_with(|| {
            groups.push(DateGroup::new(date));
            groups.len() - 1
        });
        groups[slot].eventos.push(evento.clone());
    }

    groups
}

/// The event with the earliest date on or after `today`.
///
/// Only the calendar date is compared, so an event later today still counts.
/// Ties go to whichever comes first in the input. Undated events never qualify.
pub fn next_upcoming(eventos: &[Evento], today: NaiveDate) -> Option<&Evento> {
    eventos
        .iter()
        .filter(|e| e.data().is_some_and(|d| d >= today))
        .min_by_key(|e| e.data())
}

/// Default ordering for the dashboard fetch.
pub const AGENDA_ORDER: [OrderBy; 2] = [OrderBy::asc("data"), OrderBy::asc("hora")];

/// A snapshot of the collection together with its derived views.
#[derive(Debug, Clone, Default)]
pub struct Agenda {
    eventos: Vec<Evento>,
    groups: Vec<DateGroup>,
    next: Option<usize>,
}

impl Agenda {
    pub fn from_snapshot(eventos: Vec<Evento>, today: NaiveDate) -> Self {
        let groups = group_by_date(&eventos);
        let next = next_upcoming(&eventos, today)
            .and_then(|next| eventos.iter().position(|e| std::ptr::eq(e, next)));

        Agenda {
            eventos,
            groups,
            next,
        }
    }

    /// Fetch the whole collection and derive the view from it.
    pub async fn fetch(
        service: &dyn DataService,
        collection: &str,
        today: NaiveDate,
    ) -> LicitacaoResult<Self> {
        let eventos = service.list(collection, &AGENDA_ORDER).await?;
        tracing::debug!(collection, count = eventos.len(), "fetched agenda snapshot");
        Ok(Agenda::from_snapshot(eventos, today))
    }

    pub fn groups(&self) -> &[DateGroup] {
        &self.groups
    }

    pub fn next(&self) -> Option<&Evento> {
        self.next.map(|i| &self.eventos[i])
    }

    pub fn find(&self, id: &str) -> Option<&Evento> {
        self.eventos.iter().find(|e| e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.eventos.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evento::EventoPayload;

    fn evento(id: &str, data: Option<&str>) -> Evento {
        Evento::new(
            id,
            EventoPayload {
                data: data.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
                objeto: format!("Objeto {id}"),
                ..Default::default()
            },
        )
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn groups_and_next_for_two_future_dates() {
        let eventos = vec![evento("a", Some("2025-07-30")), evento("b", Some("2025-08-05"))];

        let agenda = Agenda::from_snapshot(eventos, ymd(2025, 7, 1));

        let labels: Vec<_> = agenda.groups().iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["30/07/2025", "05/08/2025"]);
        assert_eq!(agenda.next().map(|e| e.id.as_str()), Some("a"));
    }

    #[test]
    fn groups_partition_the_input_preserving_order() {
        let eventos = vec![
            evento("1", Some("2025-08-05")),
            evento("2", None),
            evento("3", Some("2025-07-30")),
            evento("4", Some("2025-08-05")),
            evento("5", None),
            evento("6", Some("2025-07-30")),
        ];

        let groups = group_by_date(&eventos);

        let layout: Vec<(&str, Vec<&str>)> = groups
            .iter()
            .map(|g| (g.label.as_str(), g.eventos.iter().map(|e| e.id.as_str()).collect()))
            .collect();
        assert_eq!(
            layout,
            vec![
                ("05/08/2025", vec!["1", "4"]),
                ("Data indefinida", vec!["2", "5"]),
                ("30/07/2025", vec!["3", "6"]),
            ]
        );

        let total: usize = groups.iter().map(|g| g.eventos.len()).sum();
        assert_eq!(total, eventos.len());
    }

    #[test]
    fn empty_input_yields_no_groups_and_no_next() {
        let agenda = Agenda::from_snapshot(Vec::new(), ymd(2025, 1, 1));
        assert!(agenda.groups().is_empty());
        assert!(agenda.next().is_none());
        assert!(agenda.is_empty());
    }

    #[test]
    fn next_includes_events_dated_today() {
        let eventos = vec![evento("ontem", Some("2025-06-30")), evento("hoje", Some("2025-07-01"))];
        let next = next_upcoming(&eventos, ymd(2025, 7, 1));
        assert_eq!(next.map(|e| e.id.as_str()), Some("hoje"));
    }

    #[test]
    fn next_picks_minimum_regardless_of_input_order() {
        let eventos = vec![
            evento("late", Some("2025-12-01")),
            evento("early", Some("2025-07-15")),
            evento("past", Some("2025-01-01")),
        ];
        let next = next_upcoming(&eventos, ymd(2025, 7, 1));
        assert_eq!(next.map(|e| e.id.as_str()), Some("early"));
    }

    #[test]
    fn next_tie_goes_to_first_in_input() {
        let eventos = vec![
            evento("first", Some("2025-07-15")),
            evento("second", Some("2025-07-15")),
        ];
        let agenda = Agenda::from_snapshot(eventos, ymd(2025, 7, 1));
        assert_eq!(agenda.next().map(|e| e.id.as_str()), Some("first"));
    }

    #[test]
    fn next_absent_when_everything_is_past_or_undated() {
        let eventos = vec![evento("past", Some("2024-12-31")), evento("undated", None)];
        assert!(next_upcoming(&eventos, ymd(2025, 1, 1)).is_none());
    }

    #[test]
    fn find_looks_up_by_id() {
        let agenda = Agenda::from_snapshot(vec![evento("x", None)], ymd(2025, 1, 1));
        assert!(agenda.find("x").is_some());
        assert!(agenda.find("y").is_none());
    }
}
