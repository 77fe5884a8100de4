#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    timesheet_explorer_lib::run()
}
