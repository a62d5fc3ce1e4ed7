pub mod app_dto;

pub use app_dto::{
    AppForm, AppFormDocDto, AppResponseDto, CreateAppDto, ListAppsQuery, UpdateAppDto,
    UploadedImage,
};
