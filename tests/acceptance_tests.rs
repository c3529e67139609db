// Acceptance tests for the lead pipeline
// Given/When/Then scenarios for stage moves, quick select and bulk actions

use acceptance_framework::*;
use leadpipe::models::LeadStatus;

// Stage moves

#[test]
fn acceptance_moving_unassigned_lead_assigns_operator() {
    // Given agent-1 and unassigned lead Ada/555 in New
    // When agent-1 moves Ada to Interested
    // Then Ada is Interested and owned by agent-1
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    let agent = given.agent_exists("agent-1");
    let ada = given.lead_exists("Ada", "555");

    let mut when = WhenBuilder::new(&ctx);
    when.execute_success(&["move", &ada.to_string(), "Interested", "--as", "agent-1"]);

    let then = ThenBuilder::new(&ctx, when.result());
    then.message_contains("Moved to Interested")
        .lead_status_is(ada, LeadStatus::Interested)
        .lead_owner_is(ada, Some(agent));
}

#[test]
fn acceptance_moving_owned_lead_keeps_owner() {
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    let grace = given.agent_exists("Grace");
    given.agent_exists("Linus");
    let lead = given.lead_in_stage("Bob", LeadStatus::Contacted, Some(grace));

    let mut when = WhenBuilder::new(&ctx);
    when.execute_success(&["move", &lead.to_string(), "Lost", "--as", "Linus"]);

    ThenBuilder::new(&ctx, when.result())
        .lead_status_is(lead, LeadStatus::Lost)
        .lead_owner_is(lead, Some(grace));
}

#[test]
fn acceptance_closing_a_deal_announces_win() {
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    given.agent_exists("Grace");
    let lead = given.lead_exists("Ada", "555");

    let mut when = WhenBuilder::new(&ctx);
    when.execute_success(&["move", &lead.to_string(), "closed", "--as", "Grace"]);

    ThenBuilder::new(&ctx, when.result())
        .message_contains("Deal won! Ada closed.")
        .lead_status_is(lead, LeadStatus::Closed);
}

#[test]
fn acceptance_closed_lead_is_locked() {
    // Given a Closed lead
    // When any pipeline move is attempted
    // Then exit code is 1 and the lead is unchanged
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    let grace = given.agent_exists("Grace");
    let lead = given.lead_in_stage("Ada", LeadStatus::Closed, Some(grace));

    for stage in ["New", "Contacted", "Interested", "Closed", "Lost"] {
        let mut when = WhenBuilder::new(&ctx);
        when.execute_failure(&["move", &lead.to_string(), stage, "--as", "Grace"]);

        ThenBuilder::new(&ctx, when.result())
            .exit_code_is(1)
            .message_contains("closed and locked")
            .lead_status_is(lead, LeadStatus::Closed);
    }
}

#[test]
fn acceptance_closed_lead_can_be_reopened_by_direct_edit() {
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    let grace = given.agent_exists("Grace");
    let lead = given.lead_in_stage("Ada", LeadStatus::Closed, Some(grace));

    let mut when = WhenBuilder::new(&ctx);
    when.execute_success(&["edit", &lead.to_string(), "--status", "Interested"]);

    ThenBuilder::new(&ctx, when.result())
        .message_contains("Lead updated successfully")
        .lead_status_is(lead, LeadStatus::Interested);
}

#[test]
fn acceptance_move_needs_an_operator() {
    let ctx = AcceptanceTestContext::new();
    let lead = GivenBuilder::new(&ctx).lead_exists("Ada", "555");

    let mut when = WhenBuilder::new(&ctx);
    when.execute_failure(&["move", &lead.to_string(), "Contacted"]);

    ThenBuilder::new(&ctx, when.result())
        .exit_code_is(1)
        .message_contains("No operator set")
        .lead_status_is(lead, LeadStatus::New);
}

#[test]
fn acceptance_operator_from_rc_file() {
    let ctx = AcceptanceTestContext::with_rc("operator=1\n");
    let given = GivenBuilder::new(&ctx);
    let agent = given.agent_exists("Grace");
    assert_eq!(agent, 1);
    let lead = given.lead_exists("Ada", "555");

    let mut when = WhenBuilder::new(&ctx);
    when.execute_success(&["move", &lead.to_string(), "Contacted"]);

    ThenBuilder::new(&ctx, when.result()).lead_owner_is(lead, Some(agent));
}

#[test]
fn acceptance_move_unknown_lead() {
    let ctx = AcceptanceTestContext::new();
    GivenBuilder::new(&ctx).agent_exists("Grace");

    let mut when = WhenBuilder::new(&ctx);
    when.execute_failure(&["move", "42", "Contacted", "--as", "Grace"]);

    ThenBuilder::new(&ctx, when.result())
        .exit_code_is(1)
        .message_contains("Lead 42 not found");
}

// Quick select and bulk actions

#[test]
fn acceptance_quick_select_assigns_prefix_of_unassigned_pool() {
    // Given four unassigned leads, one closed unassigned lead and one owned lead
    // When quick-selecting 2 unassigned leads for Grace
    // Then the first two unassigned, non-closed leads belong to Grace
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    let grace = given.agent_exists("Grace");
    let closed = given.lead_in_stage("Won", LeadStatus::Closed, None);
    let a = given.lead_exists("A", "1");
    let owned = given.lead_in_stage("Owned", LeadStatus::New, Some(grace));
    let b = given.lead_exists("B", "2");
    let c = given.lead_exists("C", "3");

    let mut when = WhenBuilder::new(&ctx);
    when.execute_success(&["select", "unassigned", "-n", "2", "--assign", "Grace"]);

    ThenBuilder::new(&ctx, when.result())
        .message_contains("Selected 2 lead(s) from Unassigned")
        .message_contains("Assigned 2 lead(s)")
        .lead_owner_is(a, Some(grace))
        .lead_owner_is(b, Some(grace))
        .lead_owner_is(c, None)
        .lead_owner_is(closed, None)
        .lead_owner_is(owned, Some(grace));
}

#[test]
fn acceptance_quick_select_without_candidates() {
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    let grace = given.agent_exists("Grace");
    given.lead_in_stage("Won", LeadStatus::Closed, None);
    given.lead_in_stage("Mine", LeadStatus::New, Some(grace));

    let mut when = WhenBuilder::new(&ctx);
    when.execute_failure(&["select", "unassigned", "--assign", "Grace"]);

    ThenBuilder::new(&ctx, when.result())
        .exit_code_is(1)
        .message_contains("No candidates match quick-select filter 'Unassigned'");
}

#[test]
fn acceptance_closed_is_not_a_quick_select_filter() {
    let ctx = AcceptanceTestContext::new();
    GivenBuilder::new(&ctx).lead_in_stage("Won", LeadStatus::Closed, None);

    let mut when = WhenBuilder::new(&ctx);
    when.execute_failure(&["select", "Closed", "--delete"]);

    ThenBuilder::new(&ctx, when.result())
        .exit_code_is(1)
        .message_contains("Closed leads cannot be bulk selected")
        .lead_count_is(1);
}

#[test]
fn acceptance_quick_select_delete_by_stage() {
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    let lost_a = given.lead_in_stage("Gone A", LeadStatus::Lost, None);
    let lost_b = given.lead_in_stage("Gone B", LeadStatus::Lost, None);
    let keep = given.lead_exists("Keep", "1");

    let mut when = WhenBuilder::new(&ctx);
    when.execute_success(&["select", "lost", "--delete"]);

    ThenBuilder::new(&ctx, when.result())
        .message_contains("Deleted 2 lead(s)")
        .lead_does_not_exist(lost_a)
        .lead_does_not_exist(lost_b)
        .lead_status_is(keep, LeadStatus::New);
}

#[test]
fn acceptance_bulk_assign_requires_agent() {
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    let a = given.lead_exists("A", "1");
    let b = given.lead_exists("B", "2");

    let mut when = WhenBuilder::new(&ctx);
    when.execute_failure(&["assign", &format!("{},{}", a, b)]);

    ThenBuilder::new(&ctx, when.result())
        .exit_code_is(1)
        .message_contains("Select an agent to assign leads to")
        .lead_owner_is(a, None)
        .lead_owner_is(b, None);
}

#[test]
fn acceptance_bulk_assign_is_all_or_nothing() {
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    given.agent_exists("Grace");
    let a = given.lead_exists("A", "1");

    let mut when = WhenBuilder::new(&ctx);
    when.execute_failure(&["assign", &format!("{},99", a), "--to", "Grace"]);

    ThenBuilder::new(&ctx, when.result())
        .exit_code_is(1)
        .message_contains("Bulk assign failed: lead 99 not found")
        .lead_owner_is(a, None);
}

#[test]
fn acceptance_reassignment_is_reported() {
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    let grace = given.agent_exists("Grace");
    let linus = given.agent_exists("Linus");
    let lead = given.lead_in_stage("A", LeadStatus::Contacted, Some(grace));

    let mut when = WhenBuilder::new(&ctx);
    when.execute_success(&["assign", &lead.to_string(), "--to", "Linus"]);

    ThenBuilder::new(&ctx, when.result())
        .message_contains("Reassigned 1 lead(s) to Linus")
        .lead_owner_is(lead, Some(linus))
        .lead_status_is(lead, LeadStatus::Contacted);
}
