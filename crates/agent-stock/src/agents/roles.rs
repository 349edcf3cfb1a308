//! The four roles of the analysis desk

use crate::config::RoleTimeouts;
use crate::prompts::system;
use crate::tools::{FINANCE_DATA_FETCH, RISK_ASSESSMENT_TOOL, STRATEGY_SIGNAL_TOOL, TECHNICAL_ANALYSIS_TOOL};
use std::fmt;

/// A desk participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Opens the exchange and consolidates the result
    Supervisor,
    FinanceReportingAnalyst,
    TechnicalAnalyst,
    StrategyAgent,
}

impl Role {
    /// Every role in speaking order
    pub const ALL: [Role; 4] = [
        Role::Supervisor,
        Role::FinanceReportingAnalyst,
        Role::TechnicalAnalyst,
        Role::StrategyAgent,
    ];

    /// Participant name used in the transcript
    pub fn name(self) -> &'static str {
        match self {
            Role::Supervisor => "supervisor",
            Role::FinanceReportingAnalyst => "finance_reporting_analyst",
            Role::TechnicalAnalyst => "technical_analyst",
            Role::StrategyAgent => "strategy_agent",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Role::Supervisor => "Coordinates the desk and presents the consolidated summary",
            Role::FinanceReportingAnalyst => "Creates high-level financial reports",
            Role::TechnicalAnalyst => "Performs technical indicator analysis",
            Role::StrategyAgent => "Recommends Buy/Sell/Hold from trading signals and risk",
        }
    }

    /// Natural-language instruction sent as the system prompt
    pub fn instruction(self) -> &'static str {
        match self {
            Role::Supervisor => system::SUPERVISOR,
            Role::FinanceReportingAnalyst => system::FINANCE_REPORTING_ANALYST,
            Role::TechnicalAnalyst => system::TECHNICAL_ANALYST,
            Role::StrategyAgent => system::STRATEGY_AGENT,
        }
    }

    /// Tools this role may call
    pub fn tools(self) -> &'static [&'static str] {
        match self {
            Role::Supervisor => &[],
            Role::FinanceReportingAnalyst => &[FINANCE_DATA_FETCH],
            Role::TechnicalAnalyst => &[TECHNICAL_ANALYSIS_TOOL],
            Role::StrategyAgent => &[RISK_ASSESSMENT_TOOL, STRATEGY_SIGNAL_TOOL],
        }
    }

    /// LLM call timeout for this role, in seconds
    pub fn timeout_secs(self, timeouts: &RoleTimeouts) -> u64 {
        match self {
            Role::Supervisor => timeouts.coordinator,
            Role::FinanceReportingAnalyst => timeouts.finance,
            Role::TechnicalAnalyst => timeouts.technical,
            Role::StrategyAgent => timeouts.strategy,
        }
    }

    /// Participant names in speaking order
    pub fn participant_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|r| r.name()).collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaking_order() {
        assert_eq!(
            Role::participant_names(),
            vec!["supervisor", "finance_reporting_analyst", "technical_analyst", "strategy_agent"]
        );
    }

    #[test]
    fn test_each_tool_has_one_owner() {
        let mut owned: Vec<&str> = Role::ALL.iter().flat_map(|r| r.tools().iter().copied()).collect();
        owned.sort_unstable();
        assert_eq!(
            owned,
            vec![FINANCE_DATA_FETCH, RISK_ASSESSMENT_TOOL, STRATEGY_SIGNAL_TOOL, TECHNICAL_ANALYSIS_TOOL]
        );
    }

    #[test]
    fn test_timeouts() {
        let timeouts = RoleTimeouts::default();
        assert_eq!(Role::FinanceReportingAnalyst.timeout_secs(&timeouts), 280);
        assert_eq!(Role::TechnicalAnalyst.timeout_secs(&timeouts), 200);
        assert_eq!(Role::StrategyAgent.timeout_secs(&timeouts), 300);
        assert_eq!(Role::Supervisor.timeout_secs(&timeouts), 280);
    }
}
