// UseCase handlers (u501)
pub mod usecases;
