pub mod category_dto;

pub use category_dto::{
    CategoryQueryParams, CategoryResponseDto, CategoryTreeDto, CategoryTreeQueryParams,
    CreateCategoryDto, ParentSummaryDto, SlugPreviewDto, SlugPreviewQuery, UpdateCategoryDto,
};
