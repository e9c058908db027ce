#[test]
fn test_log_helpers_do_not_panic_without_a_logger() {
    crate::log::info("info");
    crate::log::warn("warn");
    crate::log::error("error");
    crate::log::debug("label", "debug");
    crate::log::action("confirm", "POST /api/phase1/choose");
    crate::log::transition("phase[1]", "scored[1]");
    crate::log::rejected("confirm", "incomplete");
    crate::log::result(true, "ok");
    crate::log::result(false, "fail");
}
