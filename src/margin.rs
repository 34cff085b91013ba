//! Revenue-side ratios. Nothing here clamps: a negative margin is a real
//! outcome and has to reach the caller as one.

pub fn payroll_percent(cost_per_student: f64, ticket_price: f64) -> f64 {
    cost_per_student / ticket_price * 100.0
}

pub fn gross_margin(payroll_percent: f64) -> f64 {
    100.0 - payroll_percent
}

pub fn monthly_recurring_revenue(total_students: u32, ticket_price: f64) -> f64 {
    f64::from(total_students) * ticket_price
}

pub fn gross_profit(revenue: f64, payroll_total: f64) -> f64 {
    revenue - payroll_total
}

pub fn net_profit(gross_profit: f64, fixed_costs: f64) -> f64 {
    gross_profit - fixed_costs
}
