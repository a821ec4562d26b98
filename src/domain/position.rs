//! Long positions and the record of one simulation run.

/// A position opened on `entry_index` at that bar's close. One unit, long only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenPosition {
    pub entry_index: usize,
    pub entry_price: f64,
}

impl OpenPosition {
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        price - self.entry_price
    }

    pub fn close(self, exit_index: usize, exit_price: f64) -> ClosedTrade {
        ClosedTrade {
            entry_index: self.entry_index,
            entry_price: self.entry_price,
            exit_index,
            exit_price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosedTrade {
    pub entry_index: usize,
    pub entry_price: f64,
    pub exit_index: usize,
    pub exit_price: f64,
}

impl ClosedTrade {
    pub fn profit(&self) -> f64 {
        self.exit_price - self.entry_price
    }

    /// Profit as a percentage of the entry price; 0 when the entry price is 0.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 {
            0.0
        } else {
            self.profit() / self.entry_price * 100.0
        }
    }

    /// Strictly positive profit. A flat trade is a loss.
    pub fn is_win(&self) -> bool {
        self.profit() > 0.0
    }
}

/// Closed trades in order plus at most one open position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradingRecord {
    closed: Vec<ClosedTrade>,
    open: Option<OpenPosition>,
}

impl TradingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_flat(&self) -> bool {
        self.open.is_none()
    }

    pub fn open_position(&self) -> Option<&OpenPosition> {
        self.open.as_ref()
    }

    pub fn closed_trades(&self) -> &[ClosedTrade] {
        &self.closed
    }

    /// Opens a position; returns `false` (and changes nothing) if one is already open.
    pub fn enter(&mut self, index: usize, price: f64) -> bool {
        if self.open.is_some() {
            return false;
        }
        self.open = Some(OpenPosition {
            entry_index: index,
            entry_price: price,
        });
        true
    }

    /// Closes the open position; returns `false` when flat.
    pub fn exit(&mut self, index: usize, price: f64) -> bool {
        match self.open.take() {
            Some(position) => {
                self.closed.push(position.close(index, price));
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profit_and_return() {
        let trade = OpenPosition {
            entry_index: 2,
            entry_price: 50.0,
        }
        .close(7, 55.0);
        assert!((trade.profit() - 5.0).abs() < f64::EPSILON);
        assert!((trade.return_pct() - 10.0).abs() < 1e-12);
        assert!(trade.is_win());
    }

    #[test]
    fn zero_entry_price_has_zero_return() {
        let trade = ClosedTrade {
            entry_index: 0,
            entry_price: 0.0,
            exit_index: 1,
            exit_price: 3.0,
        };
        assert_eq!(trade.return_pct(), 0.0);
    }

    #[test]
    fn flat_trade_is_a_loss() {
        let trade = ClosedTrade {
            entry_index: 0,
            entry_price: 10.0,
            exit_index: 1,
            exit_price: 10.0,
        };
        assert!(!trade.is_win());
    }

    #[test]
    fn record_holds_at_most_one_open_position() {
        let mut record = TradingRecord::new();
        assert!(record.is_flat());
        assert!(!record.exit(0, 1.0));

        assert!(record.enter(1, 10.0));
        assert!(!record.enter(2, 11.0));
        assert_eq!(record.open_position().unwrap().entry_index, 1);

        assert!(record.exit(3, 12.0));
        assert!(record.is_flat());
        assert_eq!(record.closed_trades().len(), 1);
        assert_eq!(record.closed_trades()[0].exit_index, 3);
    }

    #[test]
    fn unrealized_pnl_is_one_unit() {
        let position = OpenPosition {
            entry_index: 0,
            entry_price: 20.0,
        };
        assert!((position.unrealized_pnl(18.5) + 1.5).abs() < 1e-12);
    }
}
