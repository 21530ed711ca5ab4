pub mod review_list;
