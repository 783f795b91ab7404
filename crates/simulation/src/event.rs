//! Events recorded while a strategy is replayed against a market path.

/// Types of events that can occur during simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationEventType {
    /// Capital was deployed.
    PositionOpened,
    /// The path ended and the position was marked out.
    PositionClosed,
    /// Pending rewards were folded back into capital.
    Compound,
    /// LP exposure was re-centred, realizing impermanent loss.
    Rebalance,
}

/// A simulation event with full context.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationEvent {
    /// Step number when the event occurred.
    pub step: usize,
    pub event_type: SimulationEventType,
    /// Market price at the time of the event.
    pub price: f64,
    pub data: EventData,
}

/// Event-specific data payload.
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    PositionOpened {
        capital: f64,
    },
    PositionClosed {
        /// Marked value net of gas.
        final_value: f64,
        net_return: f64,
    },
    Compound {
        /// Rewards restaked.
        amount: f64,
        gas_cost: f64,
    },
    Rebalance {
        reason: String,
        /// Impermanent loss crystallized by the rebalance, in USD.
        realized_loss: f64,
        gas_cost: f64,
    },
}

impl SimulationEvent {
    #[must_use]
    pub fn position_opened(step: usize, price: f64, capital: f64) -> Self {
        Self {
            step,
            event_type: SimulationEventType::PositionOpened,
            price,
            data: EventData::PositionOpened { capital },
        }
    }

    #[must_use]
    pub fn position_closed(step: usize, price: f64, final_value: f64, net_return: f64) -> Self {
        Self {
            step,
            event_type: SimulationEventType::PositionClosed,
            price,
            data: EventData::PositionClosed {
                final_value,
                net_return,
            },
        }
    }

    #[must_use]
    pub fn compound(step: usize, price: f64, amount: f64, gas_cost: f64) -> Self {
        Self {
            step,
            event_type: SimulationEventType::Compound,
            price,
            data: EventData::Compound { amount, gas_cost },
        }
    }

    #[must_use]
    pub fn rebalance(
        step: usize,
        price: f64,
        reason: String,
        realized_loss: f64,
        gas_cost: f64,
    ) -> Self {
        Self {
            step,
            event_type: SimulationEventType::Rebalance,
            price,
            data: EventData::Rebalance {
                reason,
                realized_loss,
                gas_cost,
            },
        }
    }

    /// True for events that cost a transaction.
    #[must_use]
    pub fn is_trade(&self) -> bool {
        matches!(
            self.event_type,
            SimulationEventType::Compound | SimulationEventType::Rebalance
        )
    }
}

/// Event log for collecting all events during simulation.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<SimulationEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn record(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    #[must_use]
    pub fn events(&self) -> &[SimulationEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<SimulationEvent> {
        self.events
    }

    #[must_use]
    pub fn events_of_type(&self, event_type: SimulationEventType) -> Vec<&SimulationEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    #[must_use]
    pub fn count_by_type(&self, event_type: SimulationEventType) -> usize {
        self.events
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }

    #[must_use]
    pub fn compound_count(&self) -> usize {
        self.count_by_type(SimulationEventType::Compound)
    }

    #[must_use]
    pub fn rebalance_count(&self) -> usize {
        self.count_by_type(SimulationEventType::Rebalance)
    }

    /// Compounds plus rebalances.
    #[must_use]
    pub fn trade_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_trade()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_record_and_query() {
        let mut log = EventLog::new();

        log.record(SimulationEvent::position_opened(0, 100.0, 10_000.0));
        log.record(SimulationEvent::compound(3, 101.0, 4.2, 2.0));
        log.record(SimulationEvent::compound(6, 99.5, 4.1, 2.0));
        log.record(SimulationEvent::rebalance(
            9,
            130.0,
            "IL 5.4%".to_string(),
            270.0,
            2.0,
        ));

        assert_eq!(log.events().len(), 4);
        assert_eq!(log.compound_count(), 2);
        assert_eq!(log.rebalance_count(), 1);
        assert_eq!(log.trade_count(), 3);
        assert_eq!(log.events_of_type(SimulationEventType::PositionOpened).len(), 1);
    }

    #[test]
    fn test_opening_is_not_a_trade() {
        assert!(!SimulationEvent::position_opened(0, 1.0, 1.0).is_trade());
        assert!(SimulationEvent::compound(1, 1.0, 1.0, 0.5).is_trade());
    }
}
