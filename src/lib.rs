pub mod analysis;
pub mod commands;
pub mod models;

use commands::{
    import::{timesheet_clear_all, timesheet_export_csv, timesheet_import, timesheet_validate},
    mapping::{
        catalog_add, catalog_delete, catalog_rename, mapping_export, mapping_import,
        people_import_csv, people_list, person_add, person_delete, person_hours, person_update,
    },
    records::{
        apply_person_mapping, record_set_override, records_batch_update, records_filter,
        records_summary,
    },
    reports::{report_ranked, report_time_series, style_update, styles_get},
    servis::{servis_clear_label, servis_list, servis_set_label},
    store::{store_load, store_save},
};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(commands::new_session())
        .invoke_handler(tauri::generate_handler![
            timesheet_validate,
            timesheet_import,
            timesheet_export_csv,
            timesheet_clear_all,
            records_filter,
            records_summary,
            record_set_override,
            records_batch_update,
            apply_person_mapping,
            report_ranked,
            report_time_series,
            styles_get,
            style_update,
            catalog_add,
            catalog_rename,
            catalog_delete,
            people_list,
            person_add,
            person_update,
            person_delete,
            person_hours,
            people_import_csv,
            mapping_export,
            mapping_import,
            servis_list,
            servis_set_label,
            servis_clear_label,
            store_save,
            store_load,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
