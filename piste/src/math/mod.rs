mod great_circle;
mod linspace;
mod smooth;

pub(crate) use {great_circle::GreatCircle, linspace::linspace, smooth::moving_average};
